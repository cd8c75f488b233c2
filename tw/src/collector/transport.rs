//! Transportation collector: flights to the hub, rail to the destination, local options

use async_trait::async_trait;
use tracing::debug;

use super::{CollectContext, Collector};
use crate::domain::{
    Category, CategoryRecord, DestinationProfile, Flight, TransitMode, TransitOption, TransportAdvice, TransportLeg,
    TransportRecord,
};
use crate::provider::{Capability, ProviderError};

/// Flight offers kept per record
const MAX_FLIGHTS: usize = 2;

pub struct TransportCollector;

#[async_trait]
impl Collector for TransportCollector {
    fn category(&self) -> Category {
        Category::Transportation
    }

    async fn collect(
        &self,
        destination: &DestinationProfile,
        ctx: &CollectContext,
    ) -> Result<CategoryRecord, ProviderError> {
        let name = destination.name.as_str();
        debug!(destination = %name, "TransportCollector::collect: called");
        let framework = &ctx.framework;

        let flights = ctx.providers.flights()?;
        let transit = ctx.providers.transit()?;

        let (flights, trains, local_options) = tokio::join!(
            ctx.call(
                Capability::Flights,
                flights.search_flights(&framework.origin_city, &framework.hub_city)
            ),
            async {
                if name == framework.hub_city {
                    return Ok(Vec::new());
                }
                ctx.call(Capability::Transit, transit.transit_options(&framework.hub_city, name))
                    .await
            },
            ctx.call(Capability::Transit, transit.transit_options(name, name)),
        );

        let mut flights = flights?;
        flights.truncate(MAX_FLIGHTS);
        let trains = trains?;
        let local_options = local_options?;

        let recommendation = recommend(&flights, &trains, &local_options, &framework.hub_city);
        debug!(
            destination = %name,
            flights = flights.len(),
            trains = trains.len(),
            local = local_options.len(),
            "TransportCollector::collect: normalized"
        );

        Ok(CategoryRecord::Transportation(TransportRecord {
            flights,
            trains,
            local_options,
            recommendation,
        }))
    }
}

/// Cheapest flight, first train, and a charter car when one is offered
fn recommend(flights: &[Flight], trains: &[TransitOption], local: &[TransitOption], hub: &str) -> Vec<TransportAdvice> {
    let mut advice = Vec::new();

    if let Some(best) = flights.iter().min_by_key(|f| f.price) {
        advice.push(TransportAdvice {
            leg: TransportLeg::Flight,
            recommendation: format!("{} {}", best.carrier, best.flight_no),
            reason: format!("lowest fare ({}), departs {}", best.price, best.depart_time),
        });
    }

    if let Some(first) = trains.first() {
        let service = first.service.as_deref().unwrap_or("rail");
        let reason = match first.duration_hours {
            Some(hours) => format!("punctual and direct from {}, {}h", hub, hours),
            None => format!("direct from {}", hub),
        };
        advice.push(TransportAdvice {
            leg: TransportLeg::Rail,
            recommendation: format!("high-speed train {}", service),
            reason,
        });
    }

    if local.iter().any(|o| o.mode == TransitMode::Charter) {
        advice.push(TransportAdvice {
            leg: TransportLeg::Local,
            recommendation: "hire a charter car".to_string(),
            reason: "flexible, suits families and small groups".to_string(),
        });
    }

    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::testing::context;
    use crate::domain::DestinationProfile;

    async fn collect(name: &str) -> TransportRecord {
        let ctx = context(&[name]);
        match TransportCollector
            .collect(&DestinationProfile::new(name), &ctx)
            .await
            .unwrap()
        {
            CategoryRecord::Transportation(r) => r,
            other => panic!("unexpected record: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dali_has_all_three_legs() {
        let record = collect("Dali").await;
        assert_eq!(record.flights.len(), 2);
        assert_eq!(record.trains.len(), 2);
        assert_eq!(record.local_options.len(), 3);

        let legs: Vec<_> = record.recommendation.iter().map(|a| a.leg).collect();
        assert_eq!(legs, vec![TransportLeg::Flight, TransportLeg::Rail, TransportLeg::Local]);
        assert!(record.recommendation[0].recommendation.contains("MU5678"));
    }

    #[tokio::test]
    async fn test_no_rail_route_still_collects() {
        let record = collect("Shaxi").await;
        assert!(record.trains.is_empty());
        assert!(!record.local_options.is_empty());
        assert!(!record.recommendation.iter().any(|a| a.leg == TransportLeg::Rail));
        assert!(!record.recommendation.iter().any(|a| a.leg == TransportLeg::Local));
    }

    #[tokio::test]
    async fn test_hub_destination_skips_rail() {
        let record = collect("Kunming").await;
        assert!(record.trains.is_empty());
        assert_eq!(record.flights.len(), 2);
    }
}
