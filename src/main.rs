use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};
use log::*;
use pointwork::*;
use pointwork::train::Train;

/// A transition the console has started and owes a completion call, once
/// the dwell time returned by operate has elapsed. The core does not own
/// the clock; this queue is the external timer collaborator.
struct PendingMove {
    machine :String,
    target :PointPosition,
    due :Instant,
}

fn main() {
    simple_logging::log_to_stderr(log::LevelFilter::Info);
    info!("Starting {} v{}.", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let mut station = match std::env::args().nth(1) {
        Some(filename) => match file::load(&filename) {
            Ok(st) => st,
            Err(e) => {
                error!("Could not load station layout {:?}: {}", filename, e);
                std::process::exit(1);
            },
        },
        None => {
            info!("No station file given, using the built-in demo layout.");
            demo::demo_station()
        },
    };

    let mut pending :Vec<PendingMove> = Vec::new();
    let mut trains :Vec<Train> = Vec::new();

    println!("Station interlocking console. Type 'help' for commands.");
    let stdin = io::stdin();
    loop {
        complete_due(&mut station, &mut pending);
        print!("> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {},
            Err(e) => { error!("stdin: {}", e); break; },
        }
        let words :Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() { continue; }

        match words[0] {
            "help" => help(),
            "quit" | "exit" => break,

            "tracks" => {
                for t in station.tracks.values() {
                    println!("{:6} ({:5.1},{:5.1})-({:5.1},{:5.1}) {}", t.id,
                             t.start.row, t.start.col, t.end.row, t.end.col,
                             if t.occupied {
                                 format!("occupied by {}", t.occupied_by.as_deref().unwrap_or("?"))
                             } else { "free".to_string() });
                }
            },
            "points" => {
                for m in station.point_machines() {
                    println!("{:6} {:12} position {:8} status {:?} connected to {}",
                             m.id, m.name, m.position.as_str(), m.status, m.connected_track());
                }
            },
            "signals" => {
                let dir = words.get(1).and_then(|w| Direction::parse(w));
                for s in station.signals() {
                    if let Some(d) = dir {
                        if s.direction != d { continue; }
                    }
                    println!("{:6} {:22} {:?} {:?} aspect {:13} ({})", s.id, s.name,
                             s.kind, s.direction, s.current_aspect.as_str(),
                             s.current_aspect.color());
                }
            },
            "crossings" => {
                for c in station.level_crossings() {
                    println!("{:6} {:10} {:?}", c.id, c.name, c.state);
                }
            },

            "occupy" | "clear" => {
                if words.len() < 2 { println!("usage: {} <track> [train]", words[0]); continue; }
                let occupied = words[0] == "occupy";
                let by = words.get(2).map(|s| s.to_string());
                let was = match station.find_track(words[1]) {
                    Some(t) => t.occupied,
                    None => { println!("track not found: {}", words[1]); continue; },
                };
                if let Err(e) = station.set_occupied(words[1], occupied, by) {
                    println!("refused: {}", e);
                    continue;
                }
                for id in station.track_occupancy_changed(words[1], was, occupied) {
                    println!("signal {} dropped to RED", id);
                }
            },

            "operate" => {
                if words.len() < 3 { println!("usage: operate <machine> <NORMAL|REVERSE>"); continue; }
                let target = match PointPosition::parse(words[2]) {
                    Some(p) => p,
                    None => { println!("bad position: {}", words[2]); continue; },
                };
                match station.operate(words[1], target) {
                    Ok(Operated { transition_ms: 0, .. }) => {
                        println!("{} already at {}", words[1], target.as_str());
                    },
                    Ok(r) => {
                        println!("{} moving to {}, ready in {} ms",
                                 words[1], r.target.as_str(), r.transition_ms);
                        pending.push(PendingMove {
                            machine: words[1].to_string(),
                            target: r.target,
                            due: Instant::now() + Duration::from_millis(r.transition_ms),
                        });
                    },
                    Err(e) => println!("refused: {}", e),
                }
            },

            "aspect" => {
                if words.len() < 3 { println!("usage: aspect <signal> <ASPECT>"); continue; }
                let aspect = match Aspect::parse(words[2]) {
                    Some(a) => a,
                    None => { println!("bad aspect: {}", words[2]); continue; },
                };
                match station.set_aspect(words[1], aspect) {
                    Ok(()) => println!("{} now shows {}", words[1], aspect.as_str()),
                    Err(e) => println!("refused: {}", e),
                }
            },

            "callon" | "loopasp" => {
                if words.len() < 3 { println!("usage: {} <signal> <OFF|ON>", words[0]); continue; }
                let sub = match words[2] {
                    "OFF" => SubsidiaryAspect::Off,
                    "ON" => SubsidiaryAspect::On,
                    other => { println!("bad subsidiary aspect: {}", other); continue; },
                };
                let r = if words[0] == "callon" {
                    station.set_calling_on(words[1], sub)
                } else {
                    station.set_loop_aspect(words[1], sub)
                };
                match r {
                    Ok(()) => println!("{} updated", words[1]),
                    Err(e) => println!("refused: {}", e),
                }
            },

            "train" => {
                if words.len() < 3 { println!("usage: train <id> <track> [track ...]"); continue; }
                let route = words[2..].iter().map(|s| s.to_string()).collect();
                trains.push(Train::new(words[1], route));
                println!("train {} registered", words[1]);
            },
            "step" => {
                for tr in trains.iter_mut() {
                    if words.len() > 1 && words[1] != tr.id { continue; }
                    match tr.step(&mut station) {
                        Ok(affected) => {
                            println!("train {} on {}", tr.id, tr.current().unwrap_or("?"));
                            for id in affected {
                                println!("signal {} dropped to RED", id);
                            }
                        },
                        Err(e) => println!("train {} stopped: {}", tr.id, e),
                    }
                }
            },

            "save" => {
                if words.len() < 2 { println!("usage: save <file>"); continue; }
                match file::save(words[1], &station) {
                    Ok(()) => println!("saved to {}", words[1]),
                    Err(e) => println!("save failed: {}", e),
                }
            },

            other => println!("unknown command: {} (try 'help')", other),
        }
    }
}

fn complete_due(station :&mut Station, pending :&mut Vec<PendingMove>) {
    let now = Instant::now();
    let mut i = 0;
    while i < pending.len() {
        if pending[i].due <= now {
            let p = pending.remove(i);
            match station.complete(&p.machine, p.target) {
                Ok(()) => println!("point machine {} completed to {}",
                                   p.machine, p.target.as_str()),
                Err(e) => error!("completion of {} failed: {}", p.machine, e),
            }
        } else {
            i += 1;
        }
    }
}

fn help() {
    println!("  tracks | points | signals [UP|DOWN] | crossings   inventory");
    println!("  occupy <track> [train]                  detection feed: mark occupied");
    println!("  clear <track>                           detection feed: mark free");
    println!("  operate <machine> <NORMAL|REVERSE>      request a point move");
    println!("  aspect <signal> <ASPECT>                set a main aspect");
    println!("  callon|loopasp <signal> <OFF|ON>        home signal subsidiary aspects");
    println!("  train <id> <track> [track ...]          register a scripted train");
    println!("  step [id]                               advance trains one segment");
    println!("  save <file>                             write the station file");
    println!("  quit");
    println!("Point moves complete automatically once their dwell time has elapsed");
    println!("(checked before each command).");
}
