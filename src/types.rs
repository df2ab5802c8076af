// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ledger Visualization Engine - Type Definitions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ─── Group Id ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum GroupId {
    Liquid = 0,
    Invest = 1,
    Fixed = 2,
    Receivable = 3,
    Debt = 4,
}

impl GroupId {
    /// Stable iteration order used by every layout.
    pub const ALL: [GroupId; 5] = [
        Self::Liquid,
        Self::Invest,
        Self::Fixed,
        Self::Receivable,
        Self::Debt,
    ];

    pub fn is_debt(&self) -> bool {
        matches!(self, Self::Debt)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liquid => "liquid",
            Self::Invest => "invest",
            Self::Fixed => "fixed",
            Self::Receivable => "receivable",
            Self::Debt => "debt",
        }
    }
}

// ─── AccountGroup ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountGroup {
    pub id: GroupId,
    pub name: String,
    pub tone: String,
}

// ─── Account ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub group: GroupId,
    pub balance: Decimal,
    #[serde(default)]
    pub updated_at: i64,
}

// ─── GroupedAccounts ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupCard {
    pub group: AccountGroup,
    pub accounts: Vec<Account>,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupedAccounts {
    pub group_cards: Vec<GroupCard>,
    pub assets_total: Decimal,
    pub debt_total: Decimal,
    pub net_worth: Decimal,
}

impl GroupedAccounts {
    pub fn card(&self, id: GroupId) -> Option<&GroupCard> {
        self.group_cards.iter().find(|c| c.group.id == id)
    }

    pub fn find_account(&self, account_id: &str) -> Option<&Account> {
        self.group_cards
            .iter()
            .flat_map(|c| c.accounts.iter())
            .find(|a| a.id == account_id)
    }
}

// ─── Layout output ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RingSegment {
    pub id: GroupId,
    pub name: String,
    pub tone: String,
    pub amount: Decimal,
    pub percent: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PetalDatum {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    /// `None` for the `others` aggregate.
    pub group_id: Option<GroupId>,
    pub group_tone: String,
    pub color_variant: String,
    pub index: usize,
    pub start_angle: f64,
    pub end_angle: f64,
    pub target_radius: f64,
}

impl PetalDatum {
    pub fn is_aggregate(&self) -> bool {
        self.group_id.is_none()
    }
}

// ─── Selection ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub selected_group_id: Option<GroupId>,
    pub selected_account_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CenterText {
    pub label: String,
    pub amount: Decimal,
}

// ─── Bubbles ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BubbleNode {
    pub id: String,
    pub radius: f64,
    pub color: String,
    pub label: String,
    pub value: f64,
}

/// Position of one body as exposed to the rendering layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BodyPosition {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

/// Where a bubble sits when a ripple is triggered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BubbleSnapshot {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl BubbleSnapshot {
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.radius.is_finite() && self.radius > 0.0
    }
}

// ─── Vec2 ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length_sq(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Rotated a quarter turn counter-clockwise.
    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::MulAssign<f64> for Vec2 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl std::ops::Div<f64> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}
