// client.rs — headless client entry point. Loads `client.properties`,
// connects, and drives the session loop from line-oriented stdin
// commands rather than a rendering surface — rendering, sprite
// animation, and asset loading are explicitly out of scope,
// so this binary is the reference harness for the protocol, not a
// playable game. Grounded on the shape of `server.rs`'s startup sequence
// alongside the prior implementation's `cl_main.rs` frame loop, narrowed to this
// crate's text commands.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use wingman_client::{load_client_config, ClientEvent, GameClient};
use wingman_common::wire::input_bits;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

fn print_help() {
    println!("wingman-client [--help]");
    println!();
    println!("Reads client.properties from the current directory.");
    println!();
    println!("Commands (type at stdin, one per line):");
    println!("  matchmake                      join the public matchmaking queue");
    println!("  create <name> [password]       create a room, private if a password is given");
    println!("  join <room_id>                 join a public room");
    println!("  challenge <room_id>             request a private room's join nonce");
    println!("  join <room_id> <password> <nonce>   join a private room using a nonce from `challenge`");
    println!("  rooms                          list public rooms");
    println!("  move <udlr>                    e.g. `move ur` for up+right, `move .` to stop");
    println!("  shoot <aim_x> <aim_y>          fire in the given direction");
    println!("  chat <message>                 send a chat message");
    println!("  quit                           disconnect and exit");
}

fn parse_move_bits(arg: &str) -> u8 {
    let mut bits = 0u8;
    for ch in arg.chars() {
        bits |= match ch {
            'u' | 'U' => input_bits::UP,
            'd' | 'D' => input_bits::DOWN,
            'l' | 'L' => input_bits::LEFT,
            'r' | 'R' => input_bits::RIGHT,
            _ => 0,
        };
    }
    bits
}

fn handle_command(client: &mut GameClient, line: &str, shutdown: &Arc<AtomicBool>) {
    let mut parts = line.trim().splitn(2, char::is_whitespace);
    let Some(command) = parts.next() else { return };
    let rest = parts.next().unwrap_or("").trim();

    let result = match command {
        "" => Ok(()),
        "matchmake" => client.matchmake(),
        "create" => {
            let mut args = rest.splitn(2, char::is_whitespace);
            let name = args.next().unwrap_or("room").to_string();
            let password = args.next().filter(|s| !s.is_empty()).map(str::to_string);
            let is_private = password.is_some();
            client.create_room(name, is_private, password, DEFAULT_ROOM_MAX_PLAYERS)
        }
        "join" => {
            let mut args = rest.split_whitespace();
            let Some(room_id) = args.next().and_then(|s| s.parse::<u32>().ok()) else {
                eprintln!("usage: join <room_id> [password nonce]");
                return;
            };
            match (args.next(), args.next()) {
                (Some(password), Some(nonce)) => {
                    let hashed = wingman_client::respond_to_challenge(nonce, password);
                    client.join_room(room_id, hashed)
                }
                _ => client.join_room(room_id, String::new()),
            }
        }
        "challenge" => {
            let Some(room_id) = rest.split_whitespace().next().and_then(|s| s.parse::<u32>().ok()) else {
                eprintln!("usage: challenge <room_id>");
                return;
            };
            client.request_challenge(room_id)
        }
        "rooms" => client.list_rooms(),
        "move" => {
            let bits = parse_move_bits(rest);
            client.send_input(bits, FRAME_INTERVAL.as_secs_f32())
        }
        "shoot" => {
            let mut args = rest.split_whitespace();
            let x: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1.0);
            let y: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(0.0);
            client.shoot(x, y)
        }
        "chat" => client.send_chat(rest.to_string()),
        "quit" => {
            shutdown.store(true, Ordering::Relaxed);
            Ok(())
        }
        other => {
            eprintln!("unrecognized command: {other}");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("command failed: {e}");
    }
}

/// Room size used by the `create` command; matches the reactor's own
/// default room capacity.
const DEFAULT_ROOM_MAX_PLAYERS: u8 = 4;

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let config_path = PathBuf::from("client.properties");
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            other => {
                eprintln!("unrecognized argument: {other}");
                print_help();
                return ExitCode::FAILURE;
            }
        }
    }

    let config = match load_client_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load {}: {e}", config_path.display());
            return ExitCode::FAILURE;
        }
    };

    let mut client = match GameClient::connect(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("failed to connect: {e}");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        if let Err(e) = ctrlc::set_handler(move || {
            tracing::info!("shutdown signal received");
            shutdown.store(true, Ordering::Relaxed);
        }) {
            eprintln!("failed to install signal handler: {e}");
            return ExitCode::FAILURE;
        }
    }

    let (command_tx, command_rx) = crossbeam::channel::unbounded::<String>();
    thread::Builder::new()
        .name("wingman-client-stdin".into())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines().map_while(Result::ok) {
                if command_tx.send(line).is_err() {
                    break;
                }
            }
        })
        .expect("failed to spawn stdin reader thread");

    print_help();
    let mut last_frame = Instant::now();
    while !shutdown.load(Ordering::Relaxed) {
        for line in command_rx.try_iter() {
            handle_command(&mut client, &line, &shutdown);
        }

        for event in client.poll() {
            log_event(&event);
        }

        let dt = last_frame.elapsed().as_secs_f32();
        last_frame = Instant::now();
        client.tick(dt);

        thread::sleep(FRAME_INTERVAL);
    }

    ExitCode::SUCCESS
}

fn log_event(event: &ClientEvent) {
    match event {
        ClientEvent::Connected { local_player_id } => println!("connected as player {local_player_id}"),
        ClientEvent::MatchmakingFailed(e) => println!("matchmaking failed: {e:?}"),
        ClientEvent::RoomJoined { room_id } => println!("joined room {room_id}"),
        ClientEvent::RoomJoinFailed(e) => println!("room join failed: {e:?}"),
        ClientEvent::RoomList(rooms) => {
            for room in rooms {
                println!(
                    "room {} \"{}\" {}/{}",
                    room.room_id, room.room_name, room.player_count, room.max_players
                );
            }
        }
        ClientEvent::ChallengeIssued { nonce } => println!("challenge nonce: {nonce}"),
        ClientEvent::PlayerJoined { player_id, name } => println!("{name} (player {player_id}) joined"),
        ClientEvent::PlayerLeft { player_id } => println!("player {player_id} left"),
        ClientEvent::Chat { player_id, message } => println!("[player {player_id}] {message}"),
        ClientEvent::GameStarted => println!("game started"),
        ClientEvent::GameEnded => println!("game ended"),
        ClientEvent::Scoreboard(scores) => {
            for entry in scores {
                println!("{}: {}", entry.player_name, entry.score);
            }
        }
    }
}
