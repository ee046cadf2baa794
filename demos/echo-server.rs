use std::{
    io::{self, BufRead, BufReader, Write},
    net::{TcpListener, TcpStream},
    process, thread,
};

use clap::{App, Arg};
use lvlog::{Config, Level};

fn setup_logging(log_dir: &str, level: Level) {
    lvlog::setup(&Config::new(log_dir, "echo-server").time_format("%Y-%m-%d"));
    lvlog::global().set_level(level);
}

fn handle(stream: TcpStream) -> io::Result<()> {
    let peer = stream.peer_addr()?;
    lvlog::info!("accepted connection from {}", peer).ok();

    let mut writer = stream.try_clone()?;
    for line in BufReader::new(stream).lines() {
        let line = line?;
        lvlog::debug!("{} sent {:?}", peer, line).ok();

        match line.trim() {
            "PING" => writer.write_all(b"+PONG\r\n")?,
            "QUIT" => {
                writer.write_all(b"+OK\r\n")?;
                break;
            }
            other => writeln!(writer, "{}\r", other)?,
        }
    }

    lvlog::info!("connection from {} closed", peer).ok();
    Ok(())
}

fn main() {
    let matches = App::new("echo-server")
        .about("Line echo service demonstrating lvlog")
        .arg(
            Arg::with_name("addr")
                .long("addr")
                .takes_value(true)
                .default_value("127.0.0.1:6399"),
        )
        .arg(
            Arg::with_name("log-dir")
                .long("log-dir")
                .takes_value(true)
                .default_value("logs"),
        )
        .arg(
            Arg::with_name("level")
                .long("level")
                .takes_value(true)
                .default_value("info"),
        )
        .get_matches();

    let level = match matches.value_of("level").unwrap_or("info").parse::<Level>() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };
    setup_logging(matches.value_of("log-dir").unwrap_or("logs"), level);

    let addr = matches.value_of("addr").unwrap_or("127.0.0.1:6399");
    let listener = match TcpListener::bind(addr) {
        Ok(listener) => listener,
        Err(e) => lvlog::fatal!("failed to bind {}: {}", addr, e),
    };
    lvlog::info!("listening on {}", addr).ok();

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                thread::spawn(move || {
                    if let Err(e) = handle(stream) {
                        lvlog::warn!("connection error: {}", e).ok();
                    }
                });
            }
            Err(e) => {
                lvlog::error!("accept failed: {}", e).ok();
            }
        }
    }
}
