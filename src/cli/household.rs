//! Liability, emergency contact and insurance CLI commands

use clap::Subcommand;

use crate::display::{format_contact_list, format_liability_list, format_policy_list};
use crate::error::FinnestResult;
use crate::services::{HouseholdService, NewContact, NewLiability, NewPolicy};
use crate::storage::Storage;

/// Liability subcommands
#[derive(Subcommand)]
pub enum LiabilityCommands {
    /// Record a debt
    Add {
        /// Category (mortgage, car loan, credit card, ...)
        #[arg(value_name = "TYPE")]
        liability_type: String,
        /// Outstanding balance
        #[arg(short, long)]
        value: f64,
        #[arg(short, long)]
        currency: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long, env = "FINNEST_OWNER", default_value = "me")]
        owner: String,
    },
    List,
    /// Delete a liability
    Remove {
        /// Type, description or ID
        liability: String,
    },
}

/// Emergency contact subcommands
#[derive(Subcommand)]
pub enum ContactCommands {
    /// Add an emergency contact
    Add {
        name: String,
        #[arg(short, long)]
        relation: Option<String>,
        #[arg(short, long)]
        phone: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(long, env = "FINNEST_OWNER", default_value = "me")]
        owner: String,
    },
    List,
    /// Delete a contact
    Remove {
        /// Name or ID
        contact: String,
    },
}

/// Insurance subcommands
#[derive(Subcommand)]
pub enum InsuranceCommands {
    /// Record a policy
    Add {
        /// Insurer
        provider: String,
        /// Category (home, life, health, ...)
        #[arg(short = 't', long = "type", default_value = "other")]
        policy_type: String,
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        premium: Option<f64>,
        #[arg(long)]
        deductible: Option<f64>,
        /// Policy end date (YYYY-MM-DD)
        #[arg(long)]
        ends: Option<String>,
        #[arg(long, env = "FINNEST_OWNER", default_value = "me")]
        owner: String,
    },
    /// List policies, soonest renewal first
    List,
    /// Delete a policy
    Remove {
        /// Provider or ID
        policy: String,
    },
}

pub fn handle_liability_command(storage: &Storage, cmd: LiabilityCommands) -> FinnestResult<()> {
    let service = HouseholdService::new(storage);

    match cmd {
        LiabilityCommands::Add {
            liability_type,
            value,
            currency,
            description,
            owner,
        } => {
            let liability = service.add_liability(NewLiability {
                owner_id: owner,
                liability_type,
                description,
                currency,
                current_value: value,
            })?;
            println!("Created liability: {}", liability.label());
            println!("  Balance: {:.2} {}", liability.current_value, liability.currency);
            println!("  ID:      {}", liability.id);
        }
        LiabilityCommands::List => {
            print!("{}", format_liability_list(&service.liabilities()?));
        }
        LiabilityCommands::Remove { liability } => {
            let removed = service.remove_liability(&liability)?;
            println!("Removed liability: {}", removed.label());
        }
    }

    Ok(())
}

pub fn handle_contact_command(storage: &Storage, cmd: ContactCommands) -> FinnestResult<()> {
    let service = HouseholdService::new(storage);

    match cmd {
        ContactCommands::Add {
            name,
            relation,
            phone,
            email,
            owner,
        } => {
            let contact = service.add_contact(NewContact {
                owner_id: owner,
                name,
                relation,
                phone,
                email,
            })?;
            println!("Created contact: {} ({})", contact.name, contact.id);
        }
        ContactCommands::List => {
            print!("{}", format_contact_list(&service.contacts()?));
        }
        ContactCommands::Remove { contact } => {
            let removed = service.remove_contact(&contact)?;
            println!("Removed contact: {}", removed.name);
        }
    }

    Ok(())
}

pub fn handle_insurance_command(storage: &Storage, cmd: InsuranceCommands) -> FinnestResult<()> {
    let service = HouseholdService::new(storage);

    match cmd {
        InsuranceCommands::Add {
            provider,
            policy_type,
            number,
            premium,
            deductible,
            ends,
            owner,
        } => {
            let policy = service.add_policy(NewPolicy {
                owner_id: owner,
                provider,
                policy_type,
                policy_number: number,
                premium,
                deductible,
                end_date: ends,
            })?;
            println!("Created policy: {} ({})", policy.provider, policy.policy_type);
            if let Some(end) = policy.end_date {
                println!("  Ends: {}", end);
            }
            println!("  ID:   {}", policy.id);
        }
        InsuranceCommands::List => {
            print!("{}", format_policy_list(&service.policies()?));
        }
        InsuranceCommands::Remove { policy } => {
            let removed = service.remove_policy(&policy)?;
            println!("Removed policy: {}", removed.provider);
        }
    }

    Ok(())
}
