//! Print configuration and its reducer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Binding, ColorMode, Lamination, PaperSize, PaperType, PriceCategory, Sides};

fn one() -> u32 { 1 }

/// A customer's selection for one print product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintConfiguration {
    pub category: PriceCategory,
    pub size: PaperSize,
    pub paper_type: PaperType,
    pub color_type: ColorMode,
    pub sides: Sides,
    pub binding: Binding,
    pub lamination: Lamination,
    #[serde(default = "one")]
    pub page_count: u32,
    #[serde(default = "one")]
    pub quantity: u32,
    /// Free-form notes carried with the order (cover text, file reference, ...). Not priced.
    #[serde(default)]
    pub custom_options: BTreeMap<String, String>,
}

/// A single selection change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ConfigAction {
    SetCategory(PriceCategory),
    SetSize(PaperSize),
    SetPaperType(PaperType),
    SetColorType(ColorMode),
    SetSides(Sides),
    SetBinding(Binding),
    SetLamination(Lamination),
    SetPageCount(u32),
    SetQuantity(u32),
    SetCustomOption { key: String, value: String },
    RemoveCustomOption(String),
    Reset,
}

impl PrintConfiguration {
    pub fn defaults_for(category: PriceCategory) -> Self {
        let (size, paper_type, color_type) = match category {
            PriceCategory::BookPrintouts => (PaperSize::A4, PaperType::Standard, ColorMode::BlackWhite),
            PriceCategory::MapProducts => (PaperSize::A2, PaperType::Glossy, ColorMode::Color),
        };
        Self {
            category, size, paper_type, color_type,
            sides: Sides::Single, binding: Binding::None, lamination: Lamination::None,
            page_count: 1, quantity: 1, custom_options: BTreeMap::new(),
        }
    }

    /// Applies one action and returns the new configuration.
    ///
    /// Switching category resets every attribute to that category's defaults,
    /// keeping only the quantity. Reset keeps the category.
    pub fn reduce(self, action: ConfigAction) -> Self {
        match action {
            ConfigAction::SetCategory(category) if category == self.category => self,
            ConfigAction::SetCategory(category) => Self { quantity: self.quantity, ..Self::defaults_for(category) },
            ConfigAction::SetSize(size) => Self { size, ..self },
            ConfigAction::SetPaperType(paper_type) => Self { paper_type, ..self },
            ConfigAction::SetColorType(color_type) => Self { color_type, ..self },
            ConfigAction::SetSides(sides) => Self { sides, ..self },
            ConfigAction::SetBinding(binding) => Self { binding, ..self },
            ConfigAction::SetLamination(lamination) => Self { lamination, ..self },
            ConfigAction::SetPageCount(page_count) => Self { page_count, ..self },
            ConfigAction::SetQuantity(quantity) => Self { quantity, ..self },
            ConfigAction::SetCustomOption { key, value } => {
                let mut next = self;
                next.custom_options.insert(key, value);
                next
            }
            ConfigAction::RemoveCustomOption(key) => {
                let mut next = self;
                next.custom_options.remove(&key);
                next
            }
            ConfigAction::Reset => Self::defaults_for(self.category),
        }
    }

    pub fn apply_all(self, actions: impl IntoIterator<Item = ConfigAction>) -> Self {
        actions.into_iter().fold(self, Self::reduce)
    }
}
