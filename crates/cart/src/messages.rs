//! Notification texts shown to the shopper.
//!
//! The storefront launched in Brazil, so `pt-BR` carries the historical
//! wording; `en` is the default.

use std::fmt;
use std::str::FromStr;

/// Language used for user-facing notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    PtBr,
}

/// Error returned when a locale tag is not supported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale '{0}' (expected 'en' or 'pt-BR')")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" => Ok(Self::En),
            "pt" | "pt-br" => Ok(Self::PtBr),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::En => f.write_str("en"),
            Self::PtBr => f.write_str("pt-BR"),
        }
    }
}

/// Message catalog for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    #[must_use]
    pub const fn new(locale: Locale) -> Self {
        Self { locale }
    }

    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Requested quantity exceeds the stock level.
    #[must_use]
    pub const fn out_of_stock(&self) -> &'static str {
        match self.locale {
            Locale::En => "Requested quantity is out of stock",
            Locale::PtBr => "Quantidade solicitada fora de estoque",
        }
    }

    /// Adding a product failed for a reason other than stock.
    #[must_use]
    pub const fn add_failed(&self) -> &'static str {
        match self.locale {
            Locale::En => "Could not add the product",
            Locale::PtBr => "Erro na adição do produto",
        }
    }

    /// Removing a product failed.
    #[must_use]
    pub const fn remove_failed(&self) -> &'static str {
        match self.locale {
            Locale::En => "Could not remove the product",
            Locale::PtBr => "Erro na remoção do produto",
        }
    }

    /// Changing a product's quantity failed for a reason other than stock.
    #[must_use]
    pub const fn update_failed(&self) -> &'static str {
        match self.locale {
            Locale::En => "Could not change the product quantity",
            Locale::PtBr => "Erro na alteração de quantidade do produto",
        }
    }
}
