//! Simulated current-weather lookup

use crate::core::{Tool, ToolArgs, ToolError, ToolResult};
use anyhow::Result;
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::Celsius => write!(f, "celsius"),
            TemperatureUnit::Fahrenheit => write!(f, "fahrenheit"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherParams {
    pub location: String,
    pub unit: TemperatureUnit,
}

/// Returns a fixed forecast whose temperature depends only on the unit
pub struct GetCurrentWeatherTool {
    name: String,
}

impl GetCurrentWeatherTool {
    pub fn new() -> Self {
        Self {
            name: "getCurrentWeather".to_string(),
        }
    }

    pub fn forecast(params: &WeatherParams) -> String {
        let temperature = match params.unit {
            TemperatureUnit::Celsius => "24°C",
            TemperatureUnit::Fahrenheit => "75°F",
        };
        format!("sunny with a high of {}.", temperature)
    }
}

impl Default for GetCurrentWeatherTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for GetCurrentWeatherTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Get the current weather in a given location"
    }

    fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError> {
        let params: WeatherParams = args.deserialize()?;
        if params.location.trim().is_empty() {
            return Err(ToolError::InvalidArgs {
                message: "location must not be empty".to_string(),
            });
        }
        Ok(())
    }

    fn execute(&self, args: &ToolArgs) -> Result<ToolResult> {
        let params: WeatherParams = args.deserialize()?;
        tracing::info!(
            location = %params.location,
            unit = %params.unit,
            "Fetching weather"
        );
        Ok(ToolResult::success(Self::forecast(&params)))
    }

    fn get_parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The location to get the weather for"
                },
                "unit": {
                    "type": "string",
                    "enum": ["celsius", "fahrenheit"],
                    "description": "The unit of temperature (Celsius or Fahrenheit)"
                }
            },
            "required": ["location", "unit"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_by_unit() {
        let tool = GetCurrentWeatherTool::new();

        let args = ToolArgs::parse(r#"{"location": "Boston", "unit": "fahrenheit"}"#).unwrap();
        let result = tool.execute(&args).unwrap();
        assert!(result.success);
        assert_eq!(result.message, "sunny with a high of 75°F.");

        let args = ToolArgs::parse(r#"{"location": "Paris", "unit": "celsius"}"#).unwrap();
        assert_eq!(tool.execute(&args).unwrap().message, "sunny with a high of 24°C.");
    }

    #[test]
    fn test_validation() {
        let tool = GetCurrentWeatherTool::new();

        let missing_unit = ToolArgs::parse(r#"{"location": "Boston"}"#).unwrap();
        assert!(tool.validate_args(&missing_unit).is_err());

        let bad_unit = ToolArgs::parse(r#"{"location": "Boston", "unit": "kelvin"}"#).unwrap();
        assert!(tool.validate_args(&bad_unit).is_err());

        let blank = ToolArgs::parse(r#"{"location": " ", "unit": "celsius"}"#).unwrap();
        assert!(tool.validate_args(&blank).is_err());
    }

    #[test]
    fn test_openai_schema() {
        let schema = GetCurrentWeatherTool::new().get_openai_schema();

        assert_eq!(schema["type"], "function");
        assert_eq!(schema["function"]["name"], "getCurrentWeather");
        let params = &schema["function"]["parameters"];
        assert_eq!(params["properties"]["unit"]["enum"][1], "fahrenheit");
        assert_eq!(params["required"][0], "location");
    }
}
