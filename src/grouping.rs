// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ledger Visualization Engine - Account Grouping
//
// Derives GroupedAccounts from the account store's flat list. Recomputed on
// every account-list change; the store itself is never mutated here.

use rust_decimal::Decimal;

use crate::types::{Account, AccountGroup, GroupCard, GroupId, GroupedAccounts};

/// The fixed group catalogue, in stable iteration order.
pub fn default_groups() -> Vec<AccountGroup> {
    GroupId::ALL
        .iter()
        .map(|&id| {
            let (name, tone) = match id {
                GroupId::Liquid => ("流动资金", "#3b82f6"),
                GroupId::Invest => ("投资理财", "#8b5cf6"),
                GroupId::Fixed => ("固定资产", "#f59e0b"),
                GroupId::Receivable => ("应收款项", "#10b981"),
                GroupId::Debt => ("负债", "#ef4444"),
            };
            AccountGroup {
                id,
                name: name.to_string(),
                tone: tone.to_string(),
            }
        })
        .collect()
}

/// Bucket `accounts` into one card per group of `groups` (order preserved).
///
/// Accounts whose group is missing from `groups` are ignored. Debt balances
/// are summed as stored, so a positive debt balance reduces net worth.
pub fn group_accounts(accounts: &[Account], groups: &[AccountGroup]) -> GroupedAccounts {
    let group_cards: Vec<GroupCard> = groups
        .iter()
        .map(|group| {
            let members: Vec<Account> = accounts
                .iter()
                .filter(|a| a.group == group.id)
                .cloned()
                .collect();
            let total = members.iter().map(|a| a.balance).sum::<Decimal>();
            GroupCard {
                group: group.clone(),
                accounts: members,
                total,
            }
        })
        .collect();

    let assets_total: Decimal = group_cards
        .iter()
        .filter(|c| !c.group.id.is_debt())
        .map(|c| c.total)
        .sum();
    let debt_total: Decimal = group_cards
        .iter()
        .filter(|c| c.group.id.is_debt())
        .map(|c| c.total)
        .sum();

    GroupedAccounts {
        group_cards,
        assets_total,
        debt_total,
        net_worth: assets_total - debt_total,
    }
}
