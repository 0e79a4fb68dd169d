//! Interactive menu loop.
//!
//! Thin I/O wrapper: every option is a direct call into the node's public
//! operations.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use parley_p2p::{MeshNode, PeerAddr};

/// Print a prompt without a trailing newline and read one line.
async fn prompt(lines: &mut Lines<BufReader<Stdin>>, text: &str) -> anyhow::Result<Option<String>> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

/// Run the menu until the user quits or stdin closes.
pub async fn run(node: &MeshNode) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!();
        println!("==== Menu ====");
        println!("1. Send a message");
        println!("2. Query active peers");
        println!("3. Connect to active peers");
        println!("0. Quit");

        let Some(choice) = prompt(&mut lines, "Enter your choice: ").await? else {
            break;
        };

        match choice.trim() {
            "1" => send_message(node, &mut lines).await?,
            "2" => list_peers(node).await,
            "3" => connect_all(node).await,
            "0" => {
                println!("Shutting down...");
                break;
            }
            "" => {}
            other => println!("Invalid option {:?}, try again.", other),
        }
    }

    Ok(())
}

async fn send_message(node: &MeshNode, lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<()> {
    let Some(ip) = prompt(lines, "Recipient IP: ").await? else {
        return Ok(());
    };
    let Some(port) = prompt(lines, "Recipient port: ").await? else {
        return Ok(());
    };

    let target: PeerAddr = match format!("{}:{}", ip.trim(), port.trim()).parse() {
        Ok(addr) => addr,
        Err(e) => {
            println!("Invalid address: {}", e);
            return Ok(());
        }
    };

    let Some(body) = prompt(lines, "Message: ").await? else {
        return Ok(());
    };

    // Failures are already reported through the event stream.
    if node.send_user_message(target, &body).await.is_ok() {
        println!("Message sent to {}.", target);
    }

    Ok(())
}

async fn list_peers(node: &MeshNode) {
    let peers = node.active_peers().await;

    if peers.is_empty() {
        println!("No active peers available.");
    } else {
        println!("Active peers:");
        for peer in peers {
            println!("- {}", peer);
        }
    }
}

async fn connect_all(node: &MeshNode) {
    let sent = node.broadcast_connect().await;

    if sent == 0 {
        println!("No peers available for connection.");
    } else {
        println!("Connection requests sent to {} active peer(s).", sent);
    }
}
