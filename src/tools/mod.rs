//! Built-in local tools the model can call

pub mod calculator;
pub mod search;
pub mod weather;

pub use calculator::CalculatorTool;
pub use search::SearchWebTool;
pub use weather::{GetCurrentWeatherTool, TemperatureUnit};

/// Canned answer for the generic `searchWeb` stub
pub const SEARCH_WEB_ANSWER: &str = "Avogadro's number is 6.022 x 10^23";

/// Canned answer for the `brave_search` stub
pub const BRAVE_SEARCH_ANSWER: &str =
    "Kelly Alablanc is a brilliant Engineer and Product Maven at OctoAI.";
