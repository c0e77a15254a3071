//! Field checks applied before a ticket reaches the store

use crate::types::{NewTicket, QueueError, QueueResult, Ticket};

/// Longest accepted first or last name
pub const MAX_NAME_LEN: usize = 100;

/// Longest accepted notes text
pub const MAX_NOTES_LEN: usize = 2000;

fn check_name(field: &str, value: &str) -> QueueResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(QueueError::invalid(format!("{} must not be empty", field)));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(QueueError::invalid(format!(
            "{} exceeds {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn check_notes(notes: Option<&str>) -> QueueResult<()> {
    match notes {
        Some(notes) if notes.chars().count() > MAX_NOTES_LEN => Err(QueueError::invalid(
            format!("additionalNotes exceeds {} characters", MAX_NOTES_LEN),
        )),
        _ => Ok(()),
    }
}

fn check_appointment(schedule_appointment: bool, has_time: bool) -> QueueResult<()> {
    if has_time && !schedule_appointment {
        return Err(QueueError::invalid(
            "scheduledAppointmentTime requires scheduleAppointment",
        ));
    }
    Ok(())
}

/// Validate a create request
pub fn validate_new_ticket(ticket: &NewTicket) -> QueueResult<()> {
    check_name("firstName", &ticket.first_name)?;
    check_name("lastName", &ticket.last_name)?;
    check_notes(ticket.additional_notes.as_deref())?;
    check_appointment(
        ticket.schedule_appointment,
        ticket.scheduled_appointment_time.is_some(),
    )
}

/// Validate a ticket as it would look after an update
pub fn validate_ticket(ticket: &Ticket) -> QueueResult<()> {
    check_name("firstName", &ticket.first_name)?;
    check_name("lastName", &ticket.last_name)?;
    check_notes(ticket.additional_notes.as_deref())?;
    check_appointment(
        ticket.schedule_appointment,
        ticket.scheduled_appointment_time.is_some(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_accepts_walk_in() {
        assert!(validate_new_ticket(&NewTicket::walk_in("Grace", "Hopper")).is_ok());
    }

    #[test]
    fn test_rejects_blank_names() {
        let err = validate_new_ticket(&NewTicket::walk_in("  ", "Hopper")).unwrap_err();
        assert!(matches!(err, QueueError::InvalidTicket(ref msg) if msg.contains("firstName")));

        let err = validate_new_ticket(&NewTicket::walk_in("Grace", "")).unwrap_err();
        assert!(matches!(err, QueueError::InvalidTicket(ref msg) if msg.contains("lastName")));
    }

    #[test]
    fn test_rejects_appointment_time_without_flag() {
        let mut ticket = NewTicket::with_appointment("Grace", "Hopper", Utc::now());
        assert!(validate_new_ticket(&ticket).is_ok());

        ticket.schedule_appointment = false;
        assert!(validate_new_ticket(&ticket).is_err());
    }

    #[test]
    fn test_allows_flag_without_time() {
        let mut ticket = NewTicket::walk_in("Grace", "Hopper");
        ticket.schedule_appointment = true;
        assert!(validate_new_ticket(&ticket).is_ok());
    }

    #[test]
    fn test_rejects_oversized_notes() {
        let mut ticket = NewTicket::walk_in("Grace", "Hopper");
        ticket.additional_notes = Some("x".repeat(MAX_NOTES_LEN + 1));
        assert!(validate_new_ticket(&ticket).is_err());
    }
}
