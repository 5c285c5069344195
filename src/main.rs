//! Duck Race headless runner
//!
//! Drives one race at 60fps with a smoothing sink, logging standings as it
//! goes, then prints the final test snapshot as JSON.
//!
//! Usage: duck-race [--seed N] [--names FILE|A,B,C] [--config FILE] [--policy NAME] [--shuffle] [--heats]

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::env;
    use std::error::Error;
    use std::fs;
    use std::path::Path;

    use duck_race::consts::MIN_VIABLE_ROSTER;
    use duck_race::sim::{RaceState, SeededRandom, TrajectoryPolicy, format_clock};
    use duck_race::sink::SmoothingSink;
    use duck_race::{Lobby, LobbyError, RaceConfig, RaceController, Roster};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const REPORT_EVERY_MS: f64 = 500.0;

    #[derive(Debug, Default)]
    struct Args {
        seed: Option<u32>,
        names: Option<String>,
        config: Option<String>,
        policy: Option<String>,
        shuffle: bool,
        heats: bool,
    }

    fn parse_args() -> Result<Args, String> {
        let mut args = Args::default();
        let mut iter = env::args().skip(1);

        while let Some(flag) = iter.next() {
            let mut value = || iter.next().ok_or_else(|| format!("{flag} needs a value"));
            match flag.as_str() {
                "--seed" => {
                    let raw = value()?;
                    args.seed = Some(raw.parse().map_err(|_| format!("bad seed: {raw}"))?);
                }
                "--names" => args.names = Some(value()?),
                "--config" => args.config = Some(value()?),
                "--policy" => args.policy = Some(value()?),
                "--shuffle" => args.shuffle = true,
                "--heats" => args.heats = true,
                other => return Err(format!("unknown argument: {other}")),
            }
        }

        if args.seed.is_none() {
            if let Ok(raw) = env::var("DUCK_RACE_SEED") {
                args.seed = Some(raw.parse().map_err(|_| format!("bad DUCK_RACE_SEED: {raw}"))?);
            }
        }
        Ok(args)
    }

    /// `--names` is a file with one name per line, or a comma list
    fn load_roster(names: Option<&str>) -> Result<Roster, Box<dyn Error>> {
        let Some(names) = names else {
            return Ok(Roster::default());
        };
        if Path::new(names).is_file() {
            return Ok(Roster::parse(&fs::read_to_string(names)?)?);
        }
        Ok(Roster::from_names(names.split(','))?)
    }

    fn run_race(race: &mut RaceController<SmoothingSink>) {
        race.start();
        let mut next_report = REPORT_EVERY_MS;

        while race.state() == RaceState::Racing {
            race.tick(FRAME_MS);
            race.sink_mut().update(FRAME_MS);

            if race.elapsed_ms() >= next_report {
                next_report += REPORT_EVERY_MS;
                let leaders: Vec<&str> = race
                    .standings()
                    .iter()
                    .take(3)
                    .map(|&i| race.entities()[i].name.as_str())
                    .collect();
                log::info!(
                    "[{}] leaders: {}",
                    format_clock(race.remaining_ms()),
                    leaders.join(", ")
                );
            }
        }
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let args = parse_args()?;

        let mut config = match &args.config {
            Some(path) => RaceConfig::load(path)?,
            None => RaceConfig::default(),
        };
        if let Some(seed) = args.seed {
            config.seed = Some(seed);
        }
        if let Some(name) = &args.policy {
            config.policy =
                TrajectoryPolicy::from_str(name).ok_or_else(|| format!("unknown policy: {name}"))?;
        }

        let mut roster = load_roster(args.names.as_deref())?;
        if args.shuffle {
            // Lane order rides the cosmetic stream; outcomes stay untouched
            roster = roster.shuffled(&mut SeededRandom::new(config.cosmetic_seed()));
        }
        if !roster.is_viable() {
            log::warn!("Only {} racer, need {} for a real race", roster.len(), MIN_VIABLE_ROSTER);
        }

        let mut lobby = Lobby::new(config, roster);
        log::info!(
            "Duck Race starting: seed {}, policy {}",
            lobby.seed(),
            lobby.config().policy.as_str()
        );

        let mut race = lobby.controller(SmoothingSink::new());
        loop {
            run_race(&mut race);
            println!(
                "Heat {} winner: {}",
                lobby.heat(),
                race.sink().winner().unwrap_or("nobody")
            );
            println!("{}", race.test_state().to_json()?);

            if !args.heats {
                return Ok(());
            }
            match lobby.next_heat(&race, SmoothingSink::new()) {
                Ok(next) => race = next,
                Err(LobbyError::RosterTooSmall { count, .. }) => {
                    log::info!("Heats over with {} racer left", count);
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();

    match headless::run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; the embedding page drives RaceController
}
