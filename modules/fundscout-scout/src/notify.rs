//! Alert routing and composition for newly stored opportunities.
//!
//! Routing keys off the stable source id carried by both subscriptions and
//! opportunities. Display names are presentation only; renaming a source
//! never detaches its subscribers.

use tracing::{info, warn};

use fundscout_common::{StoredOpportunity, Subscriber};

use crate::traits::AlertSender;

/// Match each subscriber with the new opportunities from sources they follow.
/// Subscribers with no matches are omitted entirely.
pub fn route<'a>(
    subscribers: &'a [Subscriber],
    new_opportunities: &'a [StoredOpportunity],
) -> Vec<(&'a Subscriber, Vec<&'a StoredOpportunity>)> {
    subscribers
        .iter()
        .filter_map(|sub| {
            let matched: Vec<&StoredOpportunity> = new_opportunities
                .iter()
                .filter(|opp| sub.source_ids.iter().any(|id| *id == opp.source_id))
                .collect();
            if matched.is_empty() {
                None
            } else {
                Some((sub, matched))
            }
        })
        .collect()
}

/// Build the alert subject and HTML body for one subscriber's batch.
pub fn compose(opportunities: &[&StoredOpportunity]) -> (String, String) {
    let subject = format!(
        "{} New K-12 Funding Opportunit{}",
        opportunities.len(),
        if opportunities.len() == 1 { "y" } else { "ies" }
    );

    let mut body = String::from(
        "<html><body>\
         <h2>New K-12 Funding Opportunities</h2>\
         <p>The following opportunities were just discovered:</p>",
    );
    for opp in opportunities {
        body.push_str(&format!(
            "<div style=\"margin-bottom:16px\">\
             <h3>{}</h3>\
             <p><strong>Source:</strong> {}<br>\
             <strong>Amount:</strong> {}<br>\
             <strong>Deadline:</strong> {}<br>\
             <strong>Tags:</strong> {}</p>\
             <p><a href=\"{}\">View opportunity</a></p>\
             </div>",
            opp.title,
            opp.source_name,
            opp.amount_text,
            opp.deadline_text,
            opp.tags.join(", "),
            opp.url,
        ));
    }
    body.push_str("</body></html>");

    (subject, body)
}

/// Route, compose and send. Delivery failures are logged per recipient and
/// never abort the batch. Returns how many alerts went out.
pub async fn send_alerts(
    subscribers: &[Subscriber],
    new_opportunities: &[StoredOpportunity],
    sender: &dyn AlertSender,
) -> usize {
    let mut sent = 0;
    for (subscriber, matched) in route(subscribers, new_opportunities) {
        let (subject, body) = compose(&matched);
        match sender.send(&subscriber.email, &subject, &body).await {
            Ok(()) => {
                info!(recipient = %subscriber.email, count = matched.len(), "Alert sent");
                sent += 1;
            }
            Err(e) => {
                warn!(recipient = %subscriber.email, error = %e, "Alert delivery failed");
            }
        }
    }
    sent
}
