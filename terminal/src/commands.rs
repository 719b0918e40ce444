//! Command execution
//!
//! Results are printed to stdout, diagnostics go through tracing to stderr.

use color_eyre::eyre::{Result, bail};
use tracing::debug;

use algo_client::services::{
    CronSettings, Deposit, NewDeposit, NewWithdrawal, RequestStatus, Withdrawal,
};
use algo_client::{AdminAuth, Profile, SessionState, SessionStore};

use crate::opt::{AdminCommand, Command, RequestCommand, WithdrawCommand};

/// Everything a command may need
pub struct Terminal {
    session: SessionStore,
    admin: AdminAuth,
}

impl Terminal {
    pub fn new(session: SessionStore, admin: AdminAuth) -> Self {
        Self { session, admin }
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        debug!(?command, "Executing command");

        match command {
            Command::Login { email, password } => {
                let profile = self.session.login(&email, &password).await?;
                println!("Welcome back, {}", display_name(&profile));
            }
            Command::Register {
                first_name,
                last_name,
                email,
                password,
                referral_code,
            } => {
                let profile = self
                    .session
                    .register(
                        &first_name,
                        &last_name,
                        &email,
                        &password,
                        referral_code.as_deref(),
                    )
                    .await?;
                println!("Account created, welcome {}", display_name(&profile));
                print_referral(&profile);
            }
            Command::Logout => {
                self.session.logout();
                println!("Logged out");
            }
            Command::Whoami => {
                self.session.refresh_user().await;
                match self.session.state() {
                    SessionState::Authenticated(session) => print_profile(&session.profile),
                    SessionState::Suspended => {
                        bail!("Your account has been suspended. Please contact support.")
                    }
                    SessionState::Anonymous => println!("Not logged in"),
                }
            }
            Command::Balance => {
                let balance = self.session.refresh_balance().await?;
                println!("Balance: {balance:.2} USDT");
            }
            Command::Profit => {
                self.require_session()?;
                let stats = self.session.refresh_profit_data().await;
                println!(
                    "Algo profit: {:.2} USDT ({:.2}%)",
                    stats.algo_profit_amount, stats.algo_profit_percentage
                );
            }
            Command::Ai => {
                let toggle = self.session.toggle_ai_status().await?;
                let state = if toggle.ai_status { "on" } else { "off" };
                if toggle.message.is_empty() {
                    println!("AI trading is {state}");
                } else {
                    println!("AI trading is {state}: {}", toggle.message);
                }
            }
            Command::Referrals => {
                self.session.refresh_user().await;
                let profile = self.require_session()?;
                print_referral(&profile);
                println!("Referred users: {}", profile.referral_count);
                println!("Tier: {}", profile.tier);
                println!("Total commission: {:.2} USDT", profile.total_commission);
            }
            Command::Deposit(command) => self.deposit(command).await?,
            Command::Withdraw(command) => self.withdraw(command).await?,
            Command::Pairs => {
                let pairs = self.session.api().pairs().list().await?;
                for pair in pairs.iter().filter(|pair| pair.is_active) {
                    println!(
                        "{:<12} {:>14.4} {:>+8.2}%",
                        pair.symbol, pair.price, pair.change_24h
                    );
                }
            }
            Command::Admin(command) => self.admin(command).await?,
        }

        Ok(())
    }

    fn require_session(&self) -> Result<Profile> {
        match self.session.profile() {
            Some(profile) => Ok(profile),
            None => bail!("Not logged in"),
        }
    }

    async fn deposit(&self, command: RequestCommand) -> Result<()> {
        self.require_session()?;
        let deposits = self.session.api().deposits();

        match command {
            RequestCommand::Create {
                amount,
                network,
                tx_hash,
            } => {
                let deposit = deposits
                    .create(&NewDeposit {
                        amount,
                        network,
                        transaction_hash: tx_hash,
                    })
                    .await?;
                println!("Deposit request submitted, awaiting approval");
                print_deposit(&deposit);
            }
            RequestCommand::List => deposits.mine().await?.iter().for_each(print_deposit),
        }

        Ok(())
    }

    async fn withdraw(&self, command: WithdrawCommand) -> Result<()> {
        self.require_session()?;
        let withdrawals = self.session.api().withdrawals();

        match command {
            WithdrawCommand::Create {
                amount,
                wallet_address,
                network,
            } => {
                let withdrawal = withdrawals
                    .create(&NewWithdrawal {
                        amount,
                        wallet_address,
                        network,
                    })
                    .await?;
                println!("Withdrawal request submitted, awaiting approval");
                print_withdrawal(&withdrawal);
            }
            WithdrawCommand::List => withdrawals.mine().await?.iter().for_each(print_withdrawal),
        }

        Ok(())
    }

    async fn admin(&self, command: AdminCommand) -> Result<()> {
        let api = self.session.api();

        match command {
            AdminCommand::Login { email, password } => {
                self.admin.login(&email, &password)?;
                println!("Admin session started, valid for 24 hours");
                return Ok(());
            }
            AdminCommand::Logout => {
                self.admin.logout()?;
                println!("Admin session ended");
                return Ok(());
            }
            _ if !self.admin.is_authenticated()? => {
                bail!("Admin session missing or expired, run `admin login` first")
            }
            AdminCommand::Users => {
                for user in api.admin_users().list().await? {
                    println!(
                        "{:<26} {:<30} {:>12.2} {:?}",
                        user.id, user.email, user.balance, user.status
                    );
                }
            }
            AdminCommand::SetUserStatus { id, status } => {
                let user = api.admin_users().set_status(&id, status.into()).await?;
                println!("{} is now {:?}", user.email, user.status);
            }
            AdminCommand::SetBalance { id, balance } => {
                let user = api.admin_users().set_balance(&id, balance).await?;
                println!("{} balance set to {:.2}", user.email, user.balance);
            }
            AdminCommand::DeleteUser { id } => {
                api.admin_users().delete(&id).await?;
                println!("User {id} deleted");
            }
            AdminCommand::Deposits => api.deposits().all().await?.iter().for_each(print_deposit),
            AdminCommand::ReviewDeposit { id, decision } => {
                let deposit = api.deposits().set_status(&id, decision.into()).await?;
                print_deposit(&deposit);
            }
            AdminCommand::Withdrawals => api
                .withdrawals()
                .all()
                .await?
                .iter()
                .for_each(print_withdrawal),
            AdminCommand::ReviewWithdrawal { id, decision } => {
                let withdrawal = api.withdrawals().set_status(&id, decision.into()).await?;
                print_withdrawal(&withdrawal);
            }
            AdminCommand::ProfitRules => {
                for rule in api.profit_rules().list().await? {
                    let tier = rule.tier.map_or("any".to_owned(), |tier| tier.to_string());
                    println!(
                        "{:<26} tier {:<4} {:>6.2}% .. {:>6.2}% {}",
                        rule.id,
                        tier,
                        rule.min_profit_percentage,
                        rule.max_profit_percentage,
                        if rule.is_active { "active" } else { "inactive" }
                    );
                }
            }
            AdminCommand::Cron => print_cron(&api.cron_settings().get().await?),
            AdminCommand::SetCron { enabled, interval } => {
                let mut settings = api.cron_settings().get().await?;
                settings.enabled = enabled;
                settings.interval_minutes = interval;
                print_cron(&api.cron_settings().update(&settings).await?);
            }
        }

        Ok(())
    }
}

fn display_name(profile: &Profile) -> String {
    let name = profile.full_name();
    if name.is_empty() {
        profile.email.clone()
    } else {
        name
    }
}

fn print_profile(profile: &Profile) {
    println!("{} <{}>", display_name(profile), profile.email);
    println!("Balance: {:.2} USDT", profile.balance);
    println!("AI trading: {}", if profile.ai_status { "on" } else { "off" });
    println!("Tier: {}", profile.tier);
    if profile.role != "user" {
        println!("Role: {}", profile.role);
    }
}

fn print_referral(profile: &Profile) {
    if !profile.referral_code.is_empty() {
        println!("Referral code: {}", profile.referral_code);
    }
}

fn status_label(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Pending => "pending",
        RequestStatus::Approved => "approved",
        RequestStatus::Rejected => "rejected",
        RequestStatus::Unknown => "unknown",
    }
}

fn print_deposit(deposit: &Deposit) {
    println!(
        "{:<26} {:>12.2} {:<8} {:<9} {}",
        deposit.id,
        deposit.amount,
        deposit.network.as_deref().unwrap_or("-"),
        status_label(deposit.status),
        deposit.transaction_hash.as_deref().unwrap_or("")
    );
}

fn print_withdrawal(withdrawal: &Withdrawal) {
    println!(
        "{:<26} {:>12.2} {:<8} {:<9} {}",
        withdrawal.id,
        withdrawal.amount,
        withdrawal.network.as_deref().unwrap_or("-"),
        status_label(withdrawal.status),
        withdrawal.wallet_address.as_deref().unwrap_or("")
    );
}

fn print_cron(settings: &CronSettings) {
    let state = if settings.enabled { "enabled" } else { "disabled" };
    println!(
        "Profit distribution {state}, every {} minutes",
        settings.interval_minutes
    );
    if let Some(last_run) = settings.last_run {
        println!("Last run: {last_run}");
    }
    if let Some(next_run) = settings.next_run {
        println!("Next run: {next_run}");
    }
}
