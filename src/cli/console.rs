//! Interactive console shell
//!
//! Drives the banking service from the terminal: a login screen followed by
//! a menu of account operations. Domain errors are printed and the shell
//! carries on; fatal errors are returned to `main`.

use crate::cli::output;
use crate::core::{AccountRepository, BankService};
use crate::types::{format_amount, parse_amount, AccountId, AtmError, CURRENCY};
use dialoguer::{Input, Password, Select};

/// Entries of the main menu, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Balance,
    Deposit,
    Withdraw,
    Transfer,
    History,
    ChangePin,
    LogOut,
}

impl MenuItem {
    pub const ALL: [MenuItem; 7] = [
        MenuItem::Balance,
        MenuItem::Deposit,
        MenuItem::Withdraw,
        MenuItem::Transfer,
        MenuItem::History,
        MenuItem::ChangePin,
        MenuItem::LogOut,
    ];

    pub fn label(&self, history_limit: usize) -> String {
        match self {
            MenuItem::Balance => "Balance".to_string(),
            MenuItem::Deposit => "Deposit".to_string(),
            MenuItem::Withdraw => "Withdraw".to_string(),
            MenuItem::Transfer => "Transfer".to_string(),
            MenuItem::History => format!("History (last {})", history_limit),
            MenuItem::ChangePin => "Change PIN".to_string(),
            MenuItem::LogOut => "Log out".to_string(),
        }
    }
}

/// How the login screen ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginOutcome {
    LoggedIn(AccountId),
    Exit,
}

/// Terminal front end of the ATM
pub struct ConsoleShell<R: AccountRepository> {
    service: BankService<R>,
}

impl<R: AccountRepository> ConsoleShell<R> {
    pub fn new(service: BankService<R>) -> Self {
        ConsoleShell { service }
    }

    /// Run login screens and sessions until the user exits
    ///
    /// # Errors
    ///
    /// Returns the first fatal error (storage failure or a closed terminal).
    pub fn run(&mut self) -> Result<(), AtmError> {
        output::info("Welcome to the ATM. Leave the card number empty to exit.");

        loop {
            match self.login_screen()? {
                LoginOutcome::LoggedIn(account) => self.session(account)?,
                LoginOutcome::Exit => return Ok(()),
            }
        }
    }

    fn login_screen(&mut self) -> Result<LoginOutcome, AtmError> {
        let mut attempts = self.service.new_attempts();

        loop {
            let card = prompt_text("Card number")?;
            if card.is_empty() {
                return Ok(LoginOutcome::Exit);
            }
            let pin = prompt_secret("PIN")?;

            match self.service.login(&card, &pin, &mut attempts) {
                Ok(success) => {
                    output::success(&success.message);
                    return Ok(LoginOutcome::LoggedIn(success.account.id));
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) if e.ends_session() => {
                    output::error(&e.to_string());
                    return Ok(LoginOutcome::Exit);
                }
                Err(e) => output::error(&e.to_string()),
            }
        }
    }

    fn session(&mut self, account: AccountId) -> Result<(), AtmError> {
        let history_limit = self.service.config().history_limit;
        let labels: Vec<String> = MenuItem::ALL
            .iter()
            .map(|item| item.label(history_limit))
            .collect();

        loop {
            output::header(self.service.account(account)?);

            let choice = Select::new()
                .with_prompt("Choose an operation")
                .items(&labels)
                .default(0)
                .interact()
                .map_err(prompt_error)?;
            let item = MenuItem::ALL[choice];

            if item == MenuItem::LogOut {
                output::info("Logged out.");
                return Ok(());
            }

            match self.perform(account, item) {
                Ok(Some(message)) => output::success(&message),
                Ok(None) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => output::error(&e.to_string()),
            }
        }
    }

    /// Carry out one menu operation, returning the confirmation to show
    fn perform(&mut self, account: AccountId, item: MenuItem) -> Result<Option<String>, AtmError> {
        match item {
            MenuItem::Balance => {
                let balance = self.service.account(account)?.balance;
                output::info(&format!("Balance: {} {}", format_amount(balance), CURRENCY));
                Ok(None)
            }
            MenuItem::Deposit => {
                let amount = parse_amount(&prompt_text("Amount to deposit")?)?;
                Ok(Some(self.service.deposit(account, amount)?.message))
            }
            MenuItem::Withdraw => {
                let amount = parse_amount(&prompt_text("Amount to withdraw")?)?;
                Ok(Some(self.service.withdraw(account, amount)?.message))
            }
            MenuItem::Transfer => {
                let to_card = prompt_text("Recipient card number")?;
                let amount = parse_amount(&prompt_text("Amount to transfer")?)?;
                Ok(Some(self.service.transfer(account, &to_card, amount)?.message))
            }
            MenuItem::History => {
                self.print_history(account);
                Ok(None)
            }
            MenuItem::ChangePin => {
                let old_pin = prompt_secret("Current PIN")?;
                let new_pin = Password::new()
                    .with_prompt("New PIN")
                    .with_confirmation("Repeat new PIN", "PINs do not match")
                    .allow_empty_password(true)
                    .interact()
                    .map_err(prompt_error)?;
                let receipt = self
                    .service
                    .change_pin(account, &old_pin, new_pin.trim())?;
                Ok(Some(receipt.message))
            }
            MenuItem::LogOut => Ok(None),
        }
    }

    fn print_history(&self, account: AccountId) {
        let limit = self.service.config().history_limit;
        let mut entries = self.service.recent_transactions(account, limit).peekable();

        if entries.peek().is_none() {
            output::info("No operations yet.");
            return;
        }

        for tx in entries {
            println!("{}", output::format_history_line(tx));
        }
    }
}

fn prompt_text(prompt: &str) -> Result<String, AtmError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)?;
    Ok(value.trim().to_string())
}

fn prompt_secret(prompt: &str) -> Result<String, AtmError> {
    let value = Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(prompt_error)?;
    Ok(value.trim().to_string())
}

/// A failing prompt means the terminal is gone
fn prompt_error(error: dialoguer::Error) -> AtmError {
    AtmError::Io {
        message: error.to_string(),
    }
}
