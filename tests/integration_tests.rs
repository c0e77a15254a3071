//! Integration tests for the visitor queue

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use visitor_queue::broadcast::{Broadcaster, ChangeKind, EventKind, EventKinds, QueueEvent};
use visitor_queue::queue::QueueService;
use visitor_queue::selector::SelectionPolicy;
use visitor_queue::store::{FileTicketStore, TicketStore};
use visitor_queue::types::{NewTicket, QueueError, TicketId, TicketUpdate};

fn file_service(dir: &TempDir) -> QueueService {
    let store = FileTicketStore::open(dir.path().join("tickets.jsonl")).unwrap();
    QueueService::new(
        Arc::new(store),
        Broadcaster::default(),
        SelectionPolicy::default(),
    )
}

#[test]
fn test_concurrent_walk_ins_get_distinct_positions() {
    let service = Arc::new(QueueService::in_memory());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service
                    .create_ticket(NewTicket::walk_in(format!("Visitor{}", i), "Walk"), None)
                    .unwrap()
            })
        })
        .collect();

    let positions: HashSet<u64> = handles
        .into_iter()
        .map(|h| h.join().unwrap().position_in_line)
        .collect();

    assert_eq!(positions, (1..=8).collect::<HashSet<u64>>());
    assert_eq!(service.next_position_in_line().unwrap(), 9);
}

#[test]
fn test_two_simultaneous_creates_on_empty_store() {
    let service = Arc::new(QueueService::in_memory());

    let a = {
        let service = Arc::clone(&service);
        thread::spawn(move || service.create_ticket(NewTicket::walk_in("A", "One"), None))
    };
    let b = {
        let service = Arc::clone(&service);
        thread::spawn(move || service.create_ticket(NewTicket::walk_in("B", "Two"), None))
    };

    let mut positions = vec![
        a.join().unwrap().unwrap().position_in_line,
        b.join().unwrap().unwrap().position_in_line,
    ];
    positions.sort_unstable();
    assert_eq!(positions, vec![1, 2]);
}

#[test]
fn test_snapshot_then_subscribe_misses_nothing() {
    let service = QueueService::in_memory();
    service
        .create_ticket(NewTicket::walk_in("Before", "Snapshot"), None)
        .unwrap();

    let (snapshot, mut subscription) = service
        .broadcaster()
        .subscribe_with_snapshot(EventKinds::all(), service.store())
        .unwrap();
    assert_eq!(snapshot.tickets.len(), 1);

    let after = service
        .create_ticket(NewTicket::walk_in("After", "Snapshot"), Some("desk-1".into()))
        .unwrap();

    let msg = subscription.try_recv().expect("event after snapshot");
    assert_eq!(msg.sequence_id, snapshot.sequence_id);
    match msg.event {
        QueueEvent::TicketChanged {
            change,
            ticket,
            origin,
        } => {
            assert_eq!(change, ChangeKind::Created);
            assert_eq!(ticket, after);
            assert_eq!(origin.as_deref(), Some("desk-1"));
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(subscription.try_recv().is_none());
}

#[test]
fn test_snapshots_taken_during_creation_miss_no_ticket() {
    const TICKETS: usize = 200;
    let service = Arc::new(QueueService::in_memory());
    let start = Arc::new(Barrier::new(2));

    let writer = {
        let service = Arc::clone(&service);
        let start = Arc::clone(&start);
        thread::spawn(move || {
            start.wait();
            (0..TICKETS)
                .map(|i| {
                    service
                        .create_ticket(NewTicket::walk_in(format!("Visitor{}", i), "Race"), None)
                        .unwrap()
                        .id
                })
                .collect::<HashSet<TicketId>>()
        })
    };

    start.wait();
    let mut joined = Vec::new();
    while !writer.is_finished() && joined.len() < 64 {
        let pair = service
            .broadcaster()
            .subscribe_with_snapshot(EventKinds::all(), service.store())
            .unwrap();
        joined.push(pair);
        thread::yield_now();
    }
    let created = writer.join().unwrap();
    assert_eq!(created.len(), TICKETS);
    assert!(!joined.is_empty());

    for (snapshot, mut subscription) in joined {
        let mut seen: HashSet<TicketId> = snapshot.tickets.iter().map(|t| t.id).collect();
        while let Some(msg) = subscription.try_recv() {
            if let QueueEvent::TicketChanged { ticket, .. } = msg.event {
                seen.insert(ticket.id);
            }
        }
        assert_eq!(seen, created);
    }
}

#[test]
fn test_event_sequence_is_gap_free_per_subscriber() {
    let service = QueueService::in_memory();
    let mut subscription = service.broadcaster().subscribe(EventKinds::all());

    let ticket = service
        .create_ticket(NewTicket::walk_in("Grace", "Hopper"), None)
        .unwrap();
    service.request_refresh(Some("manual".into()));
    service
        .update_ticket(ticket.id, TicketUpdate::mark_done(), None)
        .unwrap();
    service.delete_ticket(ticket.id, None).unwrap();

    let mut ids = Vec::new();
    while let Some(msg) = subscription.try_recv() {
        ids.push(msg.sequence_id);
    }
    assert_eq!(ids.len(), 4);
    assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
}

#[test]
fn test_refresh_only_subscriber_skips_changes() {
    let service = QueueService::in_memory();
    let mut subscription = service
        .broadcaster()
        .subscribe(EventKinds::only(EventKind::Refresh));

    service
        .create_ticket(NewTicket::walk_in("Quiet", "Display"), None)
        .unwrap();
    assert_eq!(service.request_refresh(None), 1);

    let msg = subscription.try_recv().unwrap();
    assert_eq!(msg.event.kind(), EventKind::Refresh);
    assert!(subscription.try_recv().is_none());
}

#[test]
fn test_latest_arrival_after_deleting_newest() {
    let service = QueueService::in_memory();
    let first = service
        .create_ticket(NewTicket::walk_in("First", "Arrival"), None)
        .unwrap();
    let second = service
        .create_ticket(NewTicket::walk_in("Second", "Arrival"), None)
        .unwrap();

    assert_eq!(service.latest_arrival(Utc::now()).unwrap().id, second.id);

    let deleted = service.delete_ticket(second.id, None).unwrap();
    assert_eq!(deleted.id, second.id);
    assert_eq!(service.latest_arrival(Utc::now()).unwrap().id, first.id);

    assert!(matches!(
        service.get_ticket(second.id),
        Err(QueueError::NotFound(id)) if id == second.id
    ));
}

#[test]
fn test_done_tickets_leave_the_line_but_count_as_arrivals() {
    let service = QueueService::in_memory();
    let ticket = service
        .create_ticket(NewTicket::walk_in("Only", "Visitor"), None)
        .unwrap();

    service
        .update_ticket(ticket.id, TicketUpdate::mark_done(), None)
        .unwrap();

    let now = Utc::now();
    assert!(matches!(
        service.next_to_serve(now),
        Err(QueueError::NoEligibleTicket)
    ));
    assert!(matches!(
        service.first_in_line(now),
        Err(QueueError::NoEligibleTicket)
    ));
    assert_eq!(service.latest_arrival(now).unwrap().id, ticket.id);
    assert_eq!(service.next_position_in_line().unwrap(), 2);
}

#[test]
fn test_near_appointment_jumps_the_line() {
    let service = QueueService::in_memory();
    let now = Utc::now();

    let walk_in = service
        .create_ticket(NewTicket::walk_in("Early", "Walkin"), None)
        .unwrap();
    let far = service
        .create_ticket(
            NewTicket::with_appointment("Later", "Booking", now + Duration::hours(2)),
            None,
        )
        .unwrap();
    let near = service
        .create_ticket(
            NewTicket::with_appointment("Soon", "Booking", now + Duration::minutes(10)),
            None,
        )
        .unwrap();

    assert_eq!(service.next_to_serve(now).unwrap().id, near.id);

    let order: Vec<_> = service
        .serve_order(now)
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(order, vec![near.id, walk_in.id, far.id]);

    service
        .update_ticket(near.id, TicketUpdate::mark_done(), None)
        .unwrap();
    assert_eq!(service.next_to_serve(now).unwrap().id, walk_in.id);
}

#[test]
fn test_invalid_ticket_is_rejected_without_event() {
    let service = QueueService::in_memory();
    let mut subscription = service.broadcaster().subscribe(EventKinds::all());

    let result = service.create_ticket(NewTicket::walk_in("   ", "Blank"), None);
    assert!(matches!(result, Err(QueueError::InvalidTicket(_))));
    assert!(subscription.try_recv().is_none());
    assert!(service.list_tickets().unwrap().is_empty());
}

#[test]
fn test_tickets_survive_restart() {
    let dir = TempDir::new().unwrap();

    let kept = {
        let service = file_service(&dir);
        let kept = service
            .create_ticket(NewTicket::walk_in("Kept", "Ticket"), None)
            .unwrap();
        let removed = service
            .create_ticket(NewTicket::walk_in("Removed", "Ticket"), None)
            .unwrap();
        service
            .update_ticket(
                kept.id,
                TicketUpdate {
                    additional_notes: Some(Some("needs a form".into())),
                    ..Default::default()
                },
                None,
            )
            .unwrap();
        service.delete_ticket(removed.id, None).unwrap();
        kept
    };

    let service = file_service(&dir);
    let tickets = service.list_tickets().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].id, kept.id);
    assert_eq!(tickets[0].additional_notes.as_deref(), Some("needs a form"));

    let next = service
        .create_ticket(NewTicket::walk_in("After", "Restart"), None)
        .unwrap();
    assert!(next.id > kept.id);
    assert_eq!(next.position_in_line, kept.position_in_line + 1);
    assert_eq!(service.store().list_all().unwrap().len(), 2);
}
