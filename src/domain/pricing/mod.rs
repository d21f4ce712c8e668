//! Print pricing
//!
//! Resolves a configured print product to a unit price from the static
//! tables in [`tables`], then multiplies by page count and quantity.

pub mod configuration;
pub mod tables;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

pub use configuration::{ConfigAction, PrintConfiguration};

pub const MAX_QUANTITY: u32 = 10_000;
pub const MAX_PAGE_COUNT: u32 = 2_000;
pub const MAX_CUSTOM_OPTIONS: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceCategory { BookPrintouts, MapProducts }

impl PriceCategory {
    pub fn as_str(&self) -> &'static str {
        match self { Self::BookPrintouts => "book_printouts", Self::MapProducts => "map_products" }
    }
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "book_printouts" => Some(Self::BookPrintouts),
            "map_products" => Some(Self::MapProducts),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaperSize { A5, A4, A3, A2, A1, A0 }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperType { Standard, Premium, Glossy, Matte }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode { BlackWhite, Color }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sides { Single, Double }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding { None, Staple, Spiral, Softcover, Hardcover }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lamination { None, Matte, Gloss }

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("no {table} price for {key}")]
    NotFound { table: &'static str, key: String },

    #[error("{0}")]
    Validation(String),
}

/// Components of a unit price, before quantity is applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Per page for book printouts, per sheet for maps
    pub base: Decimal,
    pub pages: u32,
    pub binding: Decimal,
    pub lamination: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub category: PriceCategory,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
    pub breakdown: PriceBreakdown,
}

fn lookup<K: PartialEq + Debug + Copy>(table: &'static str, entries: &[(K, i64)], key: K) -> Result<Decimal, PricingError> {
    entries
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, paise)| Decimal::new(*paise, 2))
        .ok_or_else(|| PricingError::NotFound { table, key: format!("{key:?}") })
}

pub fn book_page_price(size: PaperSize, color: ColorMode, sides: Sides) -> Result<Decimal, PricingError> {
    lookup("BOOK_PRINTOUTS", tables::BOOK_PRINTOUTS, (size, color, sides))
}

pub fn book_binding_price(binding: Binding, size: PaperSize) -> Result<Decimal, PricingError> {
    lookup("BOOK_BINDINGS", tables::BOOK_BINDINGS, (binding, size))
}

pub fn book_lamination_price(lamination: Lamination, size: PaperSize) -> Result<Decimal, PricingError> {
    lookup("BOOK_LAMINATION", tables::BOOK_LAMINATION, (lamination, size))
}

pub fn map_sheet_price(size: PaperSize, paper: PaperType) -> Result<Decimal, PricingError> {
    lookup("MAP_PRODUCTS", tables::MAP_PRODUCTS, (size, paper))
}

pub fn map_lamination_price(lamination: Lamination, size: PaperSize) -> Result<Decimal, PricingError> {
    lookup("MAP_LAMINATION", tables::MAP_LAMINATION, (lamination, size))
}

/// Checks ranges and attribute combinations that no table could ever price.
pub fn validate(config: &PrintConfiguration) -> Result<(), PricingError> {
    if config.quantity == 0 || config.quantity > MAX_QUANTITY {
        return Err(PricingError::Validation(format!("quantity must be between 1 and {MAX_QUANTITY}")));
    }
    if config.category == PriceCategory::BookPrintouts && (config.page_count == 0 || config.page_count > MAX_PAGE_COUNT) {
        return Err(PricingError::Validation(format!("page_count must be between 1 and {MAX_PAGE_COUNT}")));
    }
    if config.category == PriceCategory::MapProducts && config.binding != Binding::None {
        return Err(PricingError::Validation("maps cannot be bound".into()));
    }
    if config.custom_options.len() > MAX_CUSTOM_OPTIONS {
        return Err(PricingError::Validation(format!("at most {MAX_CUSTOM_OPTIONS} custom options")));
    }
    if config.custom_options.keys().any(|k| k.trim().is_empty()) {
        return Err(PricingError::Validation("custom option names cannot be blank".into()));
    }
    Ok(())
}

/// Prices one configured line: table lookups, then page count and quantity.
pub fn quote(config: &PrintConfiguration) -> Result<PriceQuote, PricingError> {
    validate(config)?;
    let (breakdown, unit_price) = match config.category {
        PriceCategory::BookPrintouts => {
            let base = book_page_price(config.size, config.color_type, config.sides)?;
            let binding = book_binding_price(config.binding, config.size)?;
            let lamination = book_lamination_price(config.lamination, config.size)?;
            let unit = base * Decimal::from(config.page_count) + binding + lamination;
            (PriceBreakdown { base, pages: config.page_count, binding, lamination }, unit)
        }
        PriceCategory::MapProducts => {
            let base = map_sheet_price(config.size, config.paper_type)?;
            let lamination = map_lamination_price(config.lamination, config.size)?;
            (PriceBreakdown { base, pages: 1, binding: Decimal::ZERO, lamination }, base + lamination)
        }
    };
    Ok(PriceQuote {
        category: config.category,
        unit_price,
        quantity: config.quantity,
        line_total: unit_price * Decimal::from(config.quantity),
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book(size: PaperSize, color: ColorMode, sides: Sides) -> PrintConfiguration {
        PrintConfiguration { size, color_type: color, sides, ..PrintConfiguration::defaults_for(PriceCategory::BookPrintouts) }
    }

    #[test]
    fn every_tabulated_book_tuple_resolves_exactly() {
        for ((size, color, sides), paise) in tables::BOOK_PRINTOUTS {
            assert_eq!(book_page_price(*size, *color, *sides).unwrap(), Decimal::new(*paise, 2));
        }
        for ((size, paper), paise) in tables::MAP_PRODUCTS {
            assert_eq!(map_sheet_price(*size, *paper).unwrap(), Decimal::new(*paise, 2));
        }
    }

    #[test]
    fn absent_tuple_is_not_found() {
        let err = book_page_price(PaperSize::A0, ColorMode::Color, Sides::Single).unwrap_err();
        assert!(matches!(err, PricingError::NotFound { table: "BOOK_PRINTOUTS", .. }));
        assert!(map_sheet_price(PaperSize::A0, PaperType::Standard).is_err());
        assert!(book_binding_price(Binding::Hardcover, PaperSize::A3).is_err());
    }

    #[test]
    fn book_quote_multiplies_pages_and_copies() {
        let mut config = book(PaperSize::A4, ColorMode::BlackWhite, Sides::Double);
        config.page_count = 100;
        config.quantity = 3;
        config.binding = Binding::Spiral;
        config.lamination = Lamination::Matte;
        let q = quote(&config).unwrap();
        // 2.50 * 100 + 40 + 20
        assert_eq!(q.unit_price, dec!(310.00));
        assert_eq!(q.line_total, dec!(930.00));
        assert_eq!(q.breakdown.pages, 100);
    }

    #[test]
    fn map_quote_ignores_page_count() {
        let mut config = PrintConfiguration::defaults_for(PriceCategory::MapProducts);
        config.size = PaperSize::A1;
        config.lamination = Lamination::Gloss;
        config.page_count = 0;
        config.quantity = 2;
        let q = quote(&config).unwrap();
        assert_eq!(q.unit_price, dec!(400.00));
        assert_eq!(q.line_total, dec!(800.00));
    }

    #[test]
    fn out_of_range_quantity_is_validation_error() {
        let mut config = book(PaperSize::A4, ColorMode::Color, Sides::Single);
        config.quantity = 0;
        assert!(matches!(quote(&config), Err(PricingError::Validation(_))));
        config.quantity = MAX_QUANTITY + 1;
        assert!(matches!(quote(&config), Err(PricingError::Validation(_))));
        config.quantity = 1;
        config.page_count = MAX_PAGE_COUNT + 1;
        assert!(matches!(quote(&config), Err(PricingError::Validation(_))));
    }

    #[test]
    fn bound_map_is_rejected() {
        let mut config = PrintConfiguration::defaults_for(PriceCategory::MapProducts);
        config.binding = Binding::Spiral;
        assert!(matches!(quote(&config), Err(PricingError::Validation(_))));
    }

    #[test]
    fn category_round_trips_through_str() {
        for c in [PriceCategory::BookPrintouts, PriceCategory::MapProducts] {
            assert_eq!(PriceCategory::parse(c.as_str()), Some(c));
        }
        assert_eq!(PriceCategory::parse("posters"), None);
    }
}
