use super::Parser;
use crate::domain_model::UserId;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(name = "timebound", about = "Operate on time-bounded friendships")]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a friend request valid for `duration_ms` once accepted
    Send {
        from: UserId,
        to: UserId,
        #[arg(long)]
        duration_ms: i64,
    },
    /// Accept the request `from` sent to `to`
    Accept { from: UserId, to: UserId },
    /// Reject the request `from` sent to `to`
    Reject { from: UserId, to: UserId },
    /// Withdraw the pending request between two users
    Cancel { from: UserId, to: UserId },
    Unfriend { user: UserId, friend: UserId },
    Friends { user: UserId },
    Requests { user: UserId },
    IsFriend { a: UserId, b: UserId },
    /// Remove the user's expired friendships
    Sweep { user: UserId },
    /// Read one command per line from stdin against a single store
    Batch,
}
