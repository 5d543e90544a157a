use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeKind {
    Gravity,
    Impulse,
    Size,
    Points,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::Gravity,
        UpgradeKind::Impulse,
        UpgradeKind::Size,
        UpgradeKind::Points,
    ];

    fn base_cost(&self) -> u32 {
        match self {
            UpgradeKind::Gravity => 50,
            UpgradeKind::Impulse => 100,
            UpgradeKind::Size => 150,
            UpgradeKind::Points => 200,
        }
    }

    /// How much one level changes the matching multiplier or counter
    pub fn effect(&self) -> f32 {
        match self {
            UpgradeKind::Gravity => -0.1,
            UpgradeKind::Impulse => 0.15,
            UpgradeKind::Size => 0.1,
            UpgradeKind::Points => 1.0,
        }
    }

    pub fn label(&self, cost: u32) -> String {
        match self {
            UpgradeKind::Gravity => format!("Gravity -10% (Cost: {})", cost),
            UpgradeKind::Impulse => format!("Impulse +15% (Cost: {})", cost),
            UpgradeKind::Size => format!("Size +10% (Cost: {})", cost),
            UpgradeKind::Points => format!("Points per Click +1 (Cost: {})", cost),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upgrade {
    pub kind: UpgradeKind,
    pub cost: u32,
    pub level: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseError {
    InsufficientFunds { cost: u32, money: u32 },
}

impl fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseError::InsufficientFunds { cost, money } => {
                write!(f, "not enough money: need {}, have {}", cost, money)
            }
        }
    }
}

impl std::error::Error for PurchaseError {}

pub struct Shop {
    upgrades: Vec<Upgrade>,
}

impl Shop {
    pub fn new() -> Self {
        Shop {
            upgrades: UpgradeKind::ALL
                .iter()
                .map(|&kind| Upgrade {
                    kind,
                    cost: kind.base_cost(),
                    level: 0,
                })
                .collect(),
        }
    }

    /// Upgrades in display order
    pub fn upgrades(&self) -> &[Upgrade] {
        &self.upgrades
    }

    pub fn get(&self, kind: UpgradeKind) -> &Upgrade {
        // ALL covers every variant, so the lookup cannot miss
        &self.upgrades[Self::index(kind)]
    }

    pub fn can_afford(&self, kind: UpgradeKind, money: u32) -> bool {
        money >= self.get(kind).cost
    }

    /// Spend `money` on one level of `kind`; returns the bought upgrade.
    pub fn purchase(&mut self, kind: UpgradeKind, money: &mut u32) -> Result<Upgrade, PurchaseError> {
        let upgrade = &mut self.upgrades[Self::index(kind)];
        if *money < upgrade.cost {
            return Err(PurchaseError::InsufficientFunds {
                cost: upgrade.cost,
                money: *money,
            });
        }
        *money -= upgrade.cost;
        upgrade.level += 1;
        // floor(cost * 1.5)
        upgrade.cost = upgrade.cost.saturating_add(upgrade.cost / 2);
        Ok(*upgrade)
    }

    fn index(kind: UpgradeKind) -> usize {
        match kind {
            UpgradeKind::Gravity => 0,
            UpgradeKind::Impulse => 1,
            UpgradeKind::Size => 2,
            UpgradeKind::Points => 3,
        }
    }
}
