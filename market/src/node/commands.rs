//! Line-oriented operator commands for an interactive peer.

use std::fmt::Write as _;

use crate::crypto::Identity;
use crate::error::{MarketError, MarketResult};
use crate::marketplace::AuctionSnapshot;
use crate::traits::{RpcTransport, TimeProvider};

use super::peer_node::PeerNode;

pub const HELP: &str = "\
commands:
  sell <item>              open an auction for <item>
  bid <seller> <amount>    bid on <seller>'s open auction
  close                    close your auction and announce the winner
  status [seller]          show an auction (yours by default)
  peers                    refresh and list known peers
  inbox                    show received notifications
  help                     show this text
  quit                     deregister and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Sell(String),
    Bid { seller: Identity, amount: u64 },
    Close,
    Status(Option<Identity>),
    Peers,
    Inbox,
    Help,
    Quit,
}

impl UserCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> MarketResult<Option<Self>> {
        let line = line.trim();
        let Some((word, rest)) = split_word(line) else {
            return Ok(None);
        };

        let command = match word {
            "sell" if !rest.is_empty() => Self::Sell(rest.to_string()),
            "sell" => return Err(usage("sell <item>")),
            "bid" => {
                let (seller, amount) = split_word(rest).ok_or_else(|| usage("bid <seller> <amount>"))?;
                let amount = amount
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| usage("bid <seller> <amount>"))?;
                Self::Bid {
                    seller: Identity::from_hex(seller)?,
                    amount,
                }
            }
            "close" => Self::Close,
            "status" if rest.is_empty() => Self::Status(None),
            "status" => Self::Status(Some(Identity::from_hex(rest)?)),
            "peers" => Self::Peers,
            "inbox" => Self::Inbox,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => {
                return Err(MarketError::Protocol(format!(
                    "unknown command '{other}', try 'help'"
                )))
            }
        };
        Ok(Some(command))
    }
}

fn split_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    Some(match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    })
}

fn usage(form: &str) -> MarketError {
    MarketError::Protocol(format!("usage: {form}"))
}

/// Run a command against `node` and render the result for the operator.
/// `Quit` is handled by the caller.
pub async fn execute<T: RpcTransport, C: TimeProvider>(
    node: &PeerNode<T, C>,
    command: UserCommand,
) -> MarketResult<String> {
    match command {
        UserCommand::Sell(item) => {
            let snapshot = node.open_auction(&item).await?;
            Ok(format!("auction for '{}' is {}", snapshot.item, snapshot.status))
        }
        UserCommand::Bid { seller, amount } => {
            node.submit_bid(&seller, amount).await?;
            Ok(format!("bid {amount} accepted by {}", seller.short()))
        }
        UserCommand::Close => {
            let outcome = node.close_auction().await?;
            Ok(format!("auction closed: {outcome}"))
        }
        UserCommand::Status(seller) => {
            let seller = seller.unwrap_or(*node.identity());
            Ok(match node.auction_status(&seller).await? {
                Some(snapshot) => render_snapshot(&snapshot),
                None => format!("{} has no auction", seller.short()),
            })
        }
        UserCommand::Peers => {
            let peers = node.refresh_peers().await?;
            let mut out = format!("{} known peers", peers.len());
            for peer in peers {
                let _ = write!(out, "\n  {peer}");
            }
            Ok(out)
        }
        UserCommand::Inbox => {
            let notifications = node.notifications();
            if notifications.is_empty() {
                return Ok("inbox is empty".to_string());
            }
            Ok(notifications
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"))
        }
        UserCommand::Help | UserCommand::Quit => Ok(HELP.to_string()),
    }
}

fn render_snapshot(snapshot: &AuctionSnapshot) -> String {
    let mut out = format!(
        "{} selling '{}': {}, {} bids",
        snapshot.seller.short(),
        snapshot.item,
        snapshot.status,
        snapshot.bid_count
    );
    if let Some(high) = &snapshot.high_bid {
        let _ = write!(out, ", high bid {} from {}", high.amount, high.bidder.short());
    }
    if let Some(outcome) = &snapshot.outcome {
        let _ = write!(out, ", result: {outcome}");
    }
    out
}
