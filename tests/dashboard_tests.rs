//! Integration tests for the dashboard aggregation query.

use pitchdesk::storage::{
    LineItemInput, NewProposal, ProposalPatch, ProposalStatus, Storage, UserRow,
};
use rust_decimal::Decimal;

const ALICE: &str = "user-alice";
const BOB: &str = "user-bob";

fn test_storage() -> Storage {
    let storage = Storage::open_in_memory().expect("open in-memory db");
    for (id, email) in [(ALICE, "alice@example.test"), (BOB, "bob@example.test")] {
        storage
            .insert_user(&UserRow {
                id: id.to_string(),
                email: email.to_string(),
                password_hash: "unused".to_string(),
                name: "Test User".to_string(),
                created_at: 1,
            })
            .expect("insert user");
    }
    storage
}

fn item(quantity: &str, rate: &str) -> LineItemInput {
    LineItemInput {
        description: "work".to_string(),
        quantity: quantity.parse().expect("quantity"),
        rate: rate.parse().expect("rate"),
    }
}

/// Create a proposal for `user` and move it to `status`.
fn seed_proposal(storage: &Storage, user: &str, status: ProposalStatus, items: Vec<LineItemInput>) {
    let (created, _) = storage
        .create_proposal(
            user,
            &NewProposal {
                client_info: serde_json::json!({"name": "Acme Corp"}),
                engagement_type: "consulting".to_string(),
                duration: "3 months".to_string(),
                line_items: items,
            },
            1000,
        )
        .expect("create proposal");
    if status != ProposalStatus::Pending {
        storage
            .update_proposal(
                user,
                &created.id,
                &ProposalPatch {
                    status: Some(status),
                    ..Default::default()
                },
                1001,
            )
            .expect("update status")
            .expect("proposal exists");
    }
}

fn dec(s: &str) -> Decimal {
    s.parse().expect("decimal")
}

#[test]
fn empty_history_reports_all_zeros() {
    let storage = test_storage();
    let summary = storage.dashboard_summary(ALICE).expect("summary");

    assert_eq!(summary.total_proposals, 0);
    assert_eq!(summary.status_counts.pending, 0);
    assert_eq!(summary.status_counts.accepted, 0);
    assert_eq!(summary.status_counts.rejected, 0);
    assert_eq!(summary.total_revenue, Decimal::ZERO);
    assert_eq!(summary.average_value, Decimal::ZERO);
}

#[test]
fn status_counts_sum_to_total() {
    let storage = test_storage();
    seed_proposal(&storage, ALICE, ProposalStatus::Pending, vec![item("1", "10")]);
    seed_proposal(&storage, ALICE, ProposalStatus::Accepted, vec![item("1", "20")]);
    seed_proposal(&storage, ALICE, ProposalStatus::Rejected, vec![item("1", "30")]);
    seed_proposal(&storage, ALICE, ProposalStatus::Pending, vec![]);

    let summary = storage.dashboard_summary(ALICE).expect("summary");
    assert_eq!(summary.total_proposals, 4);
    assert_eq!(summary.status_counts.pending, 2);
    assert_eq!(summary.status_counts.accepted, 1);
    assert_eq!(summary.status_counts.rejected, 1);
    assert_eq!(
        summary.status_counts.pending
            + summary.status_counts.accepted
            + summary.status_counts.rejected,
        summary.total_proposals
    );
}

#[test]
fn no_accepted_proposals_means_zero_revenue_and_average() {
    let storage = test_storage();
    seed_proposal(&storage, ALICE, ProposalStatus::Pending, vec![item("2", "100")]);
    seed_proposal(&storage, ALICE, ProposalStatus::Rejected, vec![item("5", "40")]);

    let summary = storage.dashboard_summary(ALICE).expect("summary");
    assert_eq!(summary.total_proposals, 2);
    assert_eq!(summary.total_revenue, Decimal::ZERO);
    assert_eq!(summary.average_value, Decimal::ZERO);
}

#[test]
fn accepted_proposal_feeds_revenue_and_average() {
    let storage = test_storage();
    seed_proposal(
        &storage,
        ALICE,
        ProposalStatus::Accepted,
        vec![item("2", "100"), item("1", "50")],
    );

    let summary = storage.dashboard_summary(ALICE).expect("summary");
    assert_eq!(summary.status_counts.accepted, 1);
    assert_eq!(summary.total_revenue, dec("250"));
    assert_eq!(summary.average_value, dec("250"));
}

#[test]
fn average_spans_all_accepted_proposals() {
    let storage = test_storage();
    seed_proposal(&storage, ALICE, ProposalStatus::Accepted, vec![item("1", "100")]);
    seed_proposal(&storage, ALICE, ProposalStatus::Accepted, vec![item("1", "300")]);
    seed_proposal(&storage, ALICE, ProposalStatus::Pending, vec![item("1", "999")]);

    let summary = storage.dashboard_summary(ALICE).expect("summary");
    assert_eq!(summary.total_revenue, dec("400"));
    assert_eq!(summary.average_value, dec("200"));
}

#[test]
fn summary_is_scoped_to_the_requesting_user() {
    let storage = test_storage();
    seed_proposal(&storage, ALICE, ProposalStatus::Accepted, vec![item("1", "500")]);

    let summary = storage.dashboard_summary(BOB).expect("summary");
    assert_eq!(summary.total_proposals, 0);
    assert_eq!(summary.total_revenue, Decimal::ZERO);
}
