//! Console NPC: talk to a character served by a local generation server.
//!
//! Type a line and press Enter. The reply streams in on a single line that
//! is redrawn in place. Empty input or `/quit` exits.
//!
//! Set `GROMMEL_CONFIG` to a JSON file to override the client settings,
//! e.g. `{"model": "mistral", "mode": "blocking"}`. Logs go to stderr and
//! are filtered with `RUST_LOG` (e.g. `RUST_LOG=grommel=debug`).

use crossbeam_channel::{select, unbounded};
use crossterm::cursor::MoveToColumn;
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};
use grommel::{
    ClientConfig, DialogueConfig, DialogueSession, Persona, PersonaBook, StreamingReplyClient,
    TickerActor,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn load_client_config() -> ClientConfig {
    let Ok(path) = std::env::var("GROMMEL_CONFIG") else {
        return ClientConfig::default();
    };
    match std::fs::read_to_string(&path).map_err(grommel::Error::from).and_then(|raw| {
        serde_json::from_str(&raw).map_err(grommel::Error::from)
    }) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(%path, error = %err, "ignoring unreadable config");
            ClientConfig::default()
        }
    }
}

fn redraw(out: &mut impl Write, name: &str, text: &str) -> io::Result<()> {
    queue!(
        out,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(format!("{name}: ").bold()),
        Print(text)
    )?;
    out.flush()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let client = StreamingReplyClient::new(&load_client_config());
    let persona = Persona::new(
        "default",
        "Eliara",
        "A wandering herbalist who speaks warmly and briefly, and never breaks character.",
    )
    .with_speech_rate(1.0);
    let name = persona.display_name.clone();
    let book: PersonaBook = [persona].into_iter().collect();
    let mut session = DialogueSession::new(DialogueConfig::default(), Arc::new(client), Arc::new(book));

    // Stdin blocks, so it gets its own thread.
    let (line_tx, line_rx) = unbounded::<String>();
    thread::Builder::new()
        .name("grommel-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        })?;

    let ticker = TickerActor::spawn(Duration::from_millis(16))?;
    let mut out = io::stdout();
    println!("Talking to {name}. Empty line or /quit to leave.");
    print!("> ");
    out.flush()?;

    let mut shown = String::new();
    loop {
        select! {
            recv(line_rx) -> line => {
                let Ok(line) = line else { break };
                let line = line.trim();
                if line.is_empty() || line == "/quit" {
                    break;
                }
                if let Err(err) = session.submit_line(line) {
                    println!("({err})");
                    print!("> ");
                    out.flush()?;
                }
            }
            recv(ticker.receiver()) -> tick => {
                let Ok(tick) = tick else { break };
                let was_busy = session.is_busy();
                session.tick(tick.dt);

                if was_busy {
                    let text = session.current_visible_text();
                    if text != shown {
                        redraw(&mut out, &name, &text)?;
                        shown = text.into_owned();
                    }
                }
                if was_busy && !session.is_busy() {
                    shown.clear();
                    execute!(out, Print("\n> "))?;
                }
            }
        }
    }

    ticker.join();
    println!();
    for turn in session.history() {
        tracing::debug!(player = %turn.player_line, npc = %turn.npc_reply, "turn");
    }
    Ok(())
}
