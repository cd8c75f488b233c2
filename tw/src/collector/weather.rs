//! Weather collector: forecast at check-in

use async_trait::async_trait;
use tracing::debug;

use super::{CollectContext, Collector};
use crate::domain::{Category, CategoryRecord, DestinationProfile, WeatherRecord};
use crate::provider::{Capability, ProviderError};

pub struct WeatherCollector;

#[async_trait]
impl Collector for WeatherCollector {
    fn category(&self) -> Category {
        Category::Weather
    }

    async fn collect(
        &self,
        destination: &DestinationProfile,
        ctx: &CollectContext,
    ) -> Result<CategoryRecord, ProviderError> {
        let date = ctx.framework.travel_dates.check_in;
        debug!(destination = %destination.name, %date, "WeatherCollector::collect: called");
        let weather = ctx.providers.weather()?;
        let forecast = ctx
            .call(Capability::Weather, weather.forecast(destination.name.as_str(), date))
            .await?;
        Ok(CategoryRecord::Weather(WeatherRecord {
            forecast: Some(forecast),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::testing::context;
    use crate::domain::WeatherCondition;

    #[tokio::test]
    async fn test_forecast_dated_at_check_in() {
        let ctx = context(&["Shaxi"]);
        let record = WeatherCollector
            .collect(&DestinationProfile::new("Shaxi"), &ctx)
            .await
            .unwrap();
        let CategoryRecord::Weather(WeatherRecord { forecast: Some(forecast) }) = record else {
            panic!("expected a forecast");
        };
        assert_eq!(forecast.date, ctx.framework.travel_dates.check_in);
        assert_eq!(forecast.condition, WeatherCondition::LightRain);
    }

    #[tokio::test]
    async fn test_unknown_location_is_an_error() {
        let ctx = context(&["Atlantis"]);
        let result = WeatherCollector.collect(&DestinationProfile::new("Atlantis"), &ctx).await;
        assert!(matches!(result, Err(ProviderError::UnknownLocation { .. })));
    }
}
