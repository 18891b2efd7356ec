//! Hotseat match loop: bots move on a timer, humans pick from a menu.

use crate::config::Config;
use crate::render::{command_label, hand_summary};
use crate::table::Table;
use anyhow::{bail, Context};
use overload_core::{Command, PlayerId};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info, warn, Instrument};

type Input = Lines<BufReader<Stdin>>;

/// Run one match to completion
pub async fn run(config: Config) -> anyhow::Result<()> {
    let seed = config.seed.unwrap_or_else(rand::random);
    let table = Table::new(config.seats.clone(), config.rules.clone(), seed, config.bot_level)?;

    let span = tracing::info_span!("match", id = %table.id);
    play(table, config).instrument(span).await
}

async fn play(mut table: Table, config: Config) -> anyhow::Result<()> {
    let roster: Vec<String> = table.game().players.iter().map(|p| p.name.clone()).collect();
    info!(seed = table.seed, ?roster, "Match started");

    let humans = table.game().players.iter().filter(|p| !p.is_bot()).count();
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut last_human: Option<PlayerId> = None;
    let mut spectator = 0;
    let mut alive = table.game().alive_count();

    while !table.game().is_finished() {
        let seat = table.game().turn;

        if table.game().players[seat].is_bot() {
            tokio::time::sleep(config.bot_delay).await;
            let command = table.play_bot()?;
            debug!(seat, ?command, "Bot moved");
        } else {
            if humans > 1 && last_human != Some(seat) {
                pass_device(&table, seat, &mut input).await?;
            }
            last_human = Some(seat);

            let command = prompt(&mut table, seat, &mut input).await?;
            debug!(seat, ?command, "Human moved");
            // The closing recap starts from the last human move
            spectator = table.game().log.len();
            table.submit(command)?;
        }

        // With no humans at the table, narrate the public record
        if humans == 0 {
            for line in table.unread_public(&mut spectator) {
                println!("{}", line);
            }
        }

        let now_alive = table.game().alive_count();
        if now_alive < alive {
            let fallen: Vec<&str> = table
                .game()
                .players
                .iter()
                .filter(|p| !p.alive)
                .map(|p| p.name.as_str())
                .collect();
            info!(?fallen, "Player eliminated");
            alive = now_alive;
        }
    }

    // The screen is shared, so the recap is public lines only
    if humans > 0 {
        for line in table.unread_public(&mut spectator) {
            println!("  {}", line);
        }
    }

    let (winner, name) = table.winner().context("match ended without a winner")?;
    info!(winner, %name, "Match finished");
    println!("\n{} is the last system standing!", name);

    if config.dump_state {
        println!("{}", serde_json::to_string_pretty(table.game())?);
    }

    Ok(())
}

/// Blank screen between human seats so hands stay private
async fn pass_device(table: &Table, seat: PlayerId, input: &mut Input) -> anyhow::Result<()> {
    print!("\x1B[2J\x1B[H");
    println!("Pass the device to {} and press Enter", table.game().players[seat].name);
    read_line(input).await?;
    Ok(())
}

/// Show the seat what it may see and read a menu choice
async fn prompt(table: &mut Table, seat: PlayerId, input: &mut Input) -> anyhow::Result<Command> {
    for line in table.unread(seat) {
        println!("  {}", line);
    }

    let game = table.game();
    let commands = game.valid_commands();
    if commands.is_empty() {
        bail!("no legal commands for {}", game.players[seat].name);
    }

    println!();
    println!(
        "{}: {} turn(s) to take, {} cards in the deck",
        game.players[seat].name,
        game.turns_owed,
        game.deck.len()
    );
    println!("Hand: {}", hand_summary(game.hand(seat)));
    if let Some(peek) = &game.peek {
        let top: Vec<_> = peek.iter().map(|c| c.display_name()).collect();
        println!("Top of the deck: {}", top.join(", "));
    }

    for (i, command) in commands.iter().enumerate() {
        println!("  {:>2}) {}", i + 1, command_label(game, command));
    }

    loop {
        let line = read_line(input).await?;
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=commands.len()).contains(&n) => return Ok(commands[n - 1].clone()),
            _ => {
                warn!(input = %line.trim(), "Invalid choice");
                println!("Pick a number from 1 to {}", commands.len());
            }
        }
    }
}

async fn read_line(input: &mut Input) -> anyhow::Result<String> {
    match input.next_line().await? {
        Some(line) => Ok(line),
        None => bail!("input closed"),
    }
}
