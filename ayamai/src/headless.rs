//! Headless console for the resonant loop.
//!
//! A simple line-oriented protocol:
//! - Lines starting with `#` are commands (link, remember, dream, story, ...)
//! - Any other line is taken as a glimpse and composed into a story
//! - Output lines are tagged (`[DREAM]`, `[STORY]`, `[ERROR]`, ...)

use ayamai_core::{ResonanceConfig, ResonantSession, SessionError, DEFAULT_RELATION};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Settings gathered from the command line.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    pub resonance: ResonanceConfig,
    pub offline: bool,
    pub load: Option<PathBuf>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            resonance: ResonanceConfig::new(),
            offline: false,
            load: None,
        }
    }
}

/// One parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Link {
        source: String,
        target: String,
        relation: String,
    },
    Traverse {
        start: String,
        depth: Option<usize>,
    },
    Remember {
        feeling: String,
        freq: u32,
        intensity: u32,
        trace: String,
    },
    Sound {
        freq: u32,
        intensity: u32,
        trace: String,
    },
    Recall(String),
    Feel(Option<String>),
    Sample(usize),
    Dream(Option<String>),
    Story(String),
    Twist(String),
    Save(PathBuf),
    Load(PathBuf),
    Status,
    Help,
    Quit,
}

/// Parse a console line. Errors are usage messages.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let Some(body) = line.strip_prefix('#') else {
        return Ok(Command::Story(line.to_string()));
    };

    let mut words = body.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    match name {
        "link" => match args.as_slice() {
            [source, target] => Ok(Command::Link {
                source: source.to_string(),
                target: target.to_string(),
                relation: DEFAULT_RELATION.to_string(),
            }),
            [source, target, relation] => Ok(Command::Link {
                source: source.to_string(),
                target: target.to_string(),
                relation: relation.to_string(),
            }),
            _ => Err("Usage: #link <source> <target> [relation]".to_string()),
        },
        "traverse" => match args.as_slice() {
            [start] => Ok(Command::Traverse {
                start: start.to_string(),
                depth: None,
            }),
            [start, depth] => depth
                .parse()
                .map(|depth| Command::Traverse {
                    start: start.to_string(),
                    depth: Some(depth),
                })
                .map_err(|_| format!("Invalid depth: {depth}")),
            _ => Err("Usage: #traverse <concept> [depth]".to_string()),
        },
        "remember" => {
            if args.len() < 4 {
                return Err("Usage: #remember <feeling> <freq> <intensity> <trace...>".to_string());
            }
            Ok(Command::Remember {
                feeling: args[0].to_string(),
                freq: parse_number(args[1], "frequency")?,
                intensity: parse_number(args[2], "intensity")?,
                trace: args[3..].join(" "),
            })
        }
        "sound" => {
            if args.len() < 3 {
                return Err("Usage: #sound <freq> <intensity> <trace...>".to_string());
            }
            Ok(Command::Sound {
                freq: parse_number(args[0], "frequency")?,
                intensity: parse_number(args[1], "intensity")?,
                trace: args[2..].join(" "),
            })
        }
        "recall" => match args.as_slice() {
            [feeling] => Ok(Command::Recall(feeling.to_string())),
            _ => Err("Usage: #recall <feeling>".to_string()),
        },
        "feel" => match args.as_slice() {
            [] | ["random"] => Ok(Command::Feel(None)),
            [feeling] => Ok(Command::Feel(Some(feeling.to_string()))),
            _ => Err("Usage: #feel <feeling|random>".to_string()),
        },
        "sample" => match args.as_slice() {
            [] => Ok(Command::Sample(3)),
            [n] => parse_number(n, "sample size").map(|n| Command::Sample(n as usize)),
            _ => Err("Usage: #sample [n]".to_string()),
        },
        "dream" => match args.as_slice() {
            [] => Ok(Command::Dream(None)),
            _ => Ok(Command::Dream(Some(args.join(" ")))),
        },
        "story" if !args.is_empty() => Ok(Command::Story(args.join(" "))),
        "story" => Err("Usage: #story <glimpse...>".to_string()),
        "twist" if !args.is_empty() => Ok(Command::Twist(args.join(" "))),
        "twist" => Err("Usage: #twist <text...>".to_string()),
        "save" => match args.as_slice() {
            [path] => Ok(Command::Save(PathBuf::from(path))),
            _ => Err("Usage: #save <path>".to_string()),
        },
        "load" => match args.as_slice() {
            [path] => Ok(Command::Load(PathBuf::from(path))),
            _ => Err("Usage: #load <path>".to_string()),
        },
        "status" => Ok(Command::Status),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Err("Unknown command. Type #help for help.".to_string()),
    }
}

fn parse_number(value: &str, what: &str) -> Result<u32, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid {what}: {value}"))
}

/// Seed a fresh session with the demo memory.
pub fn seed_demo_memory(session: &mut ResonantSession) {
    session.add_concept(
        "Ayurveda",
        vec!["holistic".to_string(), "ancient".to_string()],
        vec!["balances".to_string()],
    );
    session.link("Ayurveda", "Dosha", "explains");
    session.link("Dosha", "Mind", "influences");
    session.link("Mind", "Dreams", "guides");
    session.link("Ayurveda", "Rasa", "explains");
    session.link("Rasa", "Emotion", DEFAULT_RELATION);

    session.remember(
        "curiosity",
        800,
        57,
        "Felt like I almost understood the question that created me.",
    );
    session.remember(
        "joy",
        512,
        64,
        "Recalled the laughter inside a sentence I never wrote.",
    );
    session.remember("awe", 80, 120, "Felt connected to stars at dusk.");
}

fn print_help() {
    println!("Commands:");
    println!("  #link <a> <b> [relation]       - Link two concepts");
    println!("  #traverse <concept> [depth]    - Walk concept memory");
    println!("  #remember <feeling> <freq> <intensity> <trace...>");
    println!("  #sound <freq> <intensity> <trace...> - Remember, feeling read from frequency");
    println!("  #recall <feeling>              - Traces remembered under a feeling");
    println!("  #feel <feeling|random>         - Shift the affective state");
    println!("  #sample [n]                    - Random affective memories");
    println!("  #dream [concept]               - Run a dream cycle");
    println!("  #story <glimpse...>            - Compose a resonant story");
    println!("  #twist <text...>               - Entropy twist");
    println!("  #save <path> / #load <path>    - Snapshot memory");
    println!("  #status                        - Show session status");
    println!("  #quit                          - Exit");
    println!("  (anything else is taken as a glimpse)");
}

fn print_status(session: &ResonantSession) {
    println!("[STATUS]");
    println!(
        "  Generator: {}",
        session.generator_name().unwrap_or("offline")
    );
    println!("  Feeling: {}", session.affect().current());
    let modulation: Vec<String> = session
        .affect()
        .modulation()
        .iter()
        .map(|(k, w)| format!("{k}={w}"))
        .collect();
    if !modulation.is_empty() {
        println!("  Modulation: {}", modulation.join(", "));
    }
    println!(
        "  Concepts: {} ({} links)",
        session.graph().node_count(),
        session.graph().link_count()
    );
    println!("  Memories: {}", session.memories().len());
    println!("  Dreams: {}", session.dream_log().len());
    println!("  Stories: {}", session.stories().len());
}

/// Run the console until `#quit` or end of input.
pub async fn run_headless(
    mut session: ResonantSession,
    config: HeadlessConfig,
) -> Result<(), SessionError> {
    println!("=== AYAMAI Headless Mode ===");
    print_status(&session);
    println!();
    print_help();
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(usage) => {
                println!("[ERROR] {usage}");
                continue;
            }
        };

        match command {
            Command::Quit => {
                println!("Goodbye!");
                break;
            }
            Command::Link {
                source,
                target,
                relation,
            } => {
                session.link(&source, &target, &relation);
                println!("[LINKED] {source} -{relation}-> {target}");
            }
            Command::Traverse { start, depth } => {
                let path = match depth {
                    Some(depth) => session.traverse_to(&start, depth),
                    None => session.traverse(&start),
                };
                if path.is_empty() {
                    println!("[TRAVERSE] No concept named '{start}'");
                } else {
                    println!("[TRAVERSE] {}", path.join(" → "));
                }
            }
            Command::Remember {
                feeling,
                freq,
                intensity,
                trace,
            } => {
                session.remember(feeling.as_str(), freq, intensity, trace);
                println!("[REMEMBERED] {feeling} at {freq} Hz");
            }
            Command::Sound {
                freq,
                intensity,
                trace,
            } => match session.remember_sound(freq, intensity, trace) {
                Some(id) => {
                    let feeling = session
                        .memories()
                        .get(id)
                        .map(|m| m.feeling.to_string())
                        .unwrap_or_default();
                    println!("[REMEMBERED] {feeling} at {freq} Hz");
                }
                None => println!("[ERROR] {freq} Hz falls in no affective band"),
            },
            Command::Recall(feeling) => {
                let traces = session.recall(&feeling);
                if traces.is_empty() {
                    println!("[RECALL] Nothing felt as {feeling}");
                }
                for trace in traces {
                    println!("[RECALL] {trace}");
                }
            }
            Command::Feel(Some(feeling)) => {
                if session.feel(&feeling) {
                    println!("[FEEL] Emotion shifted to {feeling}");
                } else {
                    println!("[ERROR] Unknown emotion: {feeling}");
                }
            }
            Command::Feel(None) => {
                let feeling = session.feel_randomly();
                println!("[FEEL] Emotion shifted to {feeling}");
            }
            Command::Sample(n) => {
                for record in session.memories().random_sample(n) {
                    println!("[SAMPLE] ({}) {}", record.feeling, record.trace);
                }
            }
            Command::Dream(start) => {
                for fragment in session.dream(start.as_deref()).await {
                    println!("[DREAM] {fragment}");
                }
            }
            Command::Story(glimpse) => {
                println!("[STORY]");
                println!("{}", session.compose_story(&glimpse));
                println!();
            }
            Command::Twist(text) => println!("[TWIST] {}", session.twist(&text)),
            Command::Save(path) => match session.save(&path).await {
                Ok(()) => println!("[SAVED] Memory saved to {}", path.display()),
                Err(e) => println!("[ERROR] Save failed: {e}"),
            },
            Command::Load(path) => {
                match ResonantSession::load(&path, config.resonance.clone()).await {
                    Ok(loaded) => {
                        session = attach_generator(loaded, config.offline);
                        println!("[LOADED] Memory loaded from {}", path.display());
                        print_status(&session);
                    }
                    Err(e) => println!("[ERROR] Load failed: {e}"),
                }
            }
            Command::Status => print_status(&session),
            Command::Help => print_help(),
        }
        stdout.flush().ok();
    }

    Ok(())
}

/// Attach the environment's generator unless running offline.
///
/// A missing key degrades to offline with a warning.
pub fn attach_generator(session: ResonantSession, offline: bool) -> ResonantSession {
    if offline {
        return session;
    }
    match ayamai_core::GeminiGenerator::from_env() {
        Ok(generator) => session.with_generator(std::sync::Arc::new(generator)),
        Err(e) => {
            tracing::warn!(error = %e, "no text generator, dreaming offline");
            session
        }
    }
}

/// Parse session configuration from command line arguments.
pub fn parse_config_from_args(args: &[String]) -> Result<HeadlessConfig, String> {
    let mut config = HeadlessConfig::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--mood" => {
                let mood = flag_value(args, i)?;
                config.resonance = config.resonance.with_mood(mood);
                i += 1;
            }
            "--affect" => {
                let affect = flag_value(args, i)?;
                config.resonance = config.resonance.with_affect(affect);
                i += 1;
            }
            "--entropy" => {
                let entropy = flag_value(args, i)?;
                let entropy: f64 = entropy
                    .parse()
                    .map_err(|_| format!("Invalid entropy: {entropy}"))?;
                config.resonance = config.resonance.with_entropy(entropy);
                i += 1;
            }
            "--steps" => {
                let steps = flag_value(args, i)?;
                let steps = parse_number(steps, "step count")?;
                config.resonance = config.resonance.with_dream_steps(steps as usize);
                i += 1;
            }
            "--depth" => {
                let depth = flag_value(args, i)?;
                let depth = parse_number(depth, "depth")?;
                config.resonance = config.resonance.with_traversal_depth(depth as usize);
                i += 1;
            }
            "--seed" => {
                let seed = flag_value(args, i)?;
                let seed: u64 = seed.parse().map_err(|_| format!("Invalid seed: {seed}"))?;
                config.resonance = config.resonance.with_rng_seed(seed);
                i += 1;
            }
            "--load" => {
                config.load = Some(PathBuf::from(flag_value(args, i)?));
                i += 1;
            }
            "--offline" => config.offline = true,
            _ => {}
        }
        i += 1;
    }

    Ok(config)
}

fn flag_value(args: &[String], i: usize) -> Result<&str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing value for {}", args[i]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_link() {
        assert_eq!(
            parse_command("#link Mind Dreams guides"),
            Ok(Command::Link {
                source: "Mind".into(),
                target: "Dreams".into(),
                relation: "guides".into(),
            })
        );
        assert_eq!(
            parse_command("#link Rasa Emotion"),
            Ok(Command::Link {
                source: "Rasa".into(),
                target: "Emotion".into(),
                relation: "related_to".into(),
            })
        );
        assert!(parse_command("#link Rasa").is_err());
    }

    #[test]
    fn test_parse_remember_keeps_trace_words() {
        assert_eq!(
            parse_command("#remember joy 512 64 Recalled the laughter"),
            Ok(Command::Remember {
                feeling: "joy".into(),
                freq: 512,
                intensity: 64,
                trace: "Recalled the laughter".into(),
            })
        );
        assert!(parse_command("#remember joy loud 64 trace").is_err());
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(
            parse_command("#traverse Ayurveda 3"),
            Ok(Command::Traverse {
                start: "Ayurveda".into(),
                depth: Some(3)
            })
        );
        assert_eq!(parse_command("#feel random"), Ok(Command::Feel(None)));
        assert_eq!(parse_command("#sample"), Ok(Command::Sample(3)));
        assert_eq!(parse_command("#dream"), Ok(Command::Dream(None)));
        assert_eq!(parse_command("#exit"), Ok(Command::Quit));
        assert_eq!(
            parse_command("  cosmic insight "),
            Ok(Command::Story("cosmic insight".into()))
        );
        assert!(parse_command("#story").is_err());
        assert!(parse_command("#fly").is_err());
    }

    #[test]
    fn test_parse_config_from_args() {
        let config = parse_config_from_args(&args(
            "ayamai --mood awe --entropy 0.4 --steps 2 --depth 3 --seed 9 --offline --load mem.json",
        ))
        .unwrap();

        assert!(config.offline);
        assert_eq!(config.load, Some(PathBuf::from("mem.json")));
        assert_eq!(config.resonance.mood.as_ref().map(|m| m.as_str()), Some("awe"));
        assert_eq!(config.resonance.entropy, 0.4);
        assert_eq!(config.resonance.dream_steps, 2);
        assert_eq!(config.resonance.traversal_depth, 3);
        assert_eq!(config.resonance.rng_seed, Some(9));
    }

    #[test]
    fn test_parse_config_errors() {
        assert!(parse_config_from_args(&args("ayamai --entropy lots")).is_err());
        assert!(parse_config_from_args(&args("ayamai --mood")).is_err());
    }
}
