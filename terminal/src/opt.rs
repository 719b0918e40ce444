use clap::{Parser, Subcommand, ValueEnum};
use clio::Input;

use algo_client::AccountStatus;
use algo_client::services::RequestStatus;

#[derive(Debug, Parser)]
#[command(
    name = "algo-terminal",
    about = "Terminal client of the ALGO-trading platform"
)]
pub struct Opt {
    /// Config file path
    #[arg(short, long, value_parser, default_value = "config.toml")]
    pub config: Input,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Logs in with email and password
    Login { email: String, password: String },

    /// Creates an account and logs into it
    Register {
        first_name: String,
        last_name: String,
        email: String,
        password: String,
        /// Code of the user who referred you
        #[arg(long)]
        referral_code: Option<String>,
    },

    /// Forgets the stored session
    Logout,

    /// Refreshes and shows the profile
    Whoami,

    /// Refreshes and shows the balance
    Balance,

    /// Refreshes and shows the algo trading profit
    Profit,

    /// Switches AI trading on or off
    Ai,

    /// Shows the referral code and commission
    Referrals,

    /// Deposit requests
    #[command(subcommand)]
    Deposit(RequestCommand),

    /// Withdrawal requests
    #[command(subcommand)]
    Withdraw(WithdrawCommand),

    /// Lists trading pairs
    Pairs,

    /// Admin console
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Debug, Subcommand)]
pub enum RequestCommand {
    /// Submits a deposit request
    Create {
        amount: f64,
        /// Network the funds were sent on, eg. TRC20
        network: String,
        /// Transaction hash of the transfer
        #[arg(long)]
        tx_hash: Option<String>,
    },
    /// Lists your deposit requests
    List,
}

#[derive(Debug, Subcommand)]
pub enum WithdrawCommand {
    /// Submits a withdrawal request
    Create {
        amount: f64,
        wallet_address: String,
        network: String,
    },
    /// Lists your withdrawal requests
    List,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Logs into the admin console
    Login { email: String, password: String },
    /// Leaves the admin console
    Logout,
    /// Lists users
    Users,
    /// Activates or suspends a user
    SetUserStatus { id: String, status: UserStatus },
    /// Overrides the balance of a user
    SetBalance { id: String, balance: f64 },
    /// Deletes a user
    DeleteUser { id: String },
    /// Lists all deposit requests
    Deposits,
    /// Approves or rejects a deposit request
    ReviewDeposit { id: String, decision: Decision },
    /// Lists all withdrawal requests
    Withdrawals,
    /// Approves or rejects a withdrawal request
    ReviewWithdrawal { id: String, decision: Decision },
    /// Lists profit rules
    ProfitRules,
    /// Shows the profit scheduler settings
    Cron,
    /// Changes the profit scheduler settings
    SetCron {
        #[arg(long, action = clap::ArgAction::Set)]
        enabled: bool,
        /// Minutes between runs
        #[arg(long)]
        interval: u32,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Decision {
    Approve,
    Reject,
}

impl From<Decision> for RequestStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UserStatus {
    Active,
    Inactive,
}

impl From<UserStatus> for AccountStatus {
    fn from(status: UserStatus) -> Self {
        match status {
            UserStatus::Active => AccountStatus::Active,
            UserStatus::Inactive => AccountStatus::Inactive,
        }
    }
}
