use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::session::{ActionItem, InputReference, ResultPayload};
use crate::summary::ResultProducer;

/// Offline producer that returns a canned Q3 planning summary for any input.
#[derive(Debug, Default, Clone, Copy)]
pub struct SampleProducer;

impl SampleProducer {
    pub fn payload() -> ResultPayload {
        ResultPayload {
            summary_points: vec![
                "Team agreed on Q3 marketing strategy focusing on social media campaigns and video content.".to_string(),
                "Budget was approved for $50,000, with $30,000 allocated to paid ads and $20,000 to content creation.".to_string(),
                "Campaign will target 25-40 age demographic in urban areas with interests in technology and sustainability.".to_string(),
                "New analytics tool will be implemented to track campaign performance with weekly reporting.".to_string(),
            ],
            action_items: vec![
                ActionItem::new(
                    "Set up new analytics dashboard for campaign tracking",
                    Some("July 15, 2025"),
                ),
                ActionItem::new("Finalize content calendar for Q3", Some("July 10, 2025")),
                ActionItem::new(
                    "Brief design team on new campaign assets",
                    Some("July 20, 2025"),
                ),
                ActionItem::new("Schedule weekly progress meetings for campaign duration", None),
                ActionItem::new(
                    "Prepare mid-campaign report for executive team",
                    Some("August 15, 2025"),
                ),
            ],
        }
    }
}

#[async_trait]
impl ResultProducer for SampleProducer {
    fn name(&self) -> &'static str {
        "Sample"
    }

    async fn produce(&self, input: &InputReference) -> Result<ResultPayload> {
        debug!("Producing sample result for {} input", input.kind());
        Ok(Self::payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TextInput;

    #[tokio::test]
    async fn test_sample_payload_shape() {
        let input = InputReference::Text(TextInput {
            content: "Q3 planning notes".to_string(),
        });
        let result = SampleProducer.produce(&input).await.unwrap();

        assert_eq!(result.summary_points.len(), 4);
        assert_eq!(result.action_items.len(), 5);
        assert_eq!(
            result
                .action_items
                .iter()
                .filter(|item| item.deadline.is_none())
                .count(),
            1
        );
    }
}
