mod common;

use serde_json::json;

use cinema_booking::seating::SeatSelectionSession;
use cinema_booking::services::{
    BookingDraft, BookingError, BookingService, BookingSubmission, SubmissionState,
};
use cinema_booking::store::{Collection, StoreError};

use common::{seeded_store, viewer, SCHEDULE};

async fn draft_for(bookings: &BookingService, seats: &[&str]) -> BookingDraft {
    let mut session = SeatSelectionSession::new();
    let ticket = session.begin_load();
    session.apply_load(ticket, bookings.load_seat_map(SCHEDULE).await.unwrap());
    for seat in seats {
        session.toggle(seat);
    }
    session.draft()
}

#[tokio::test]
async fn conflicting_seat_is_rejected_without_write() {
    let store = seeded_store().await;
    let bookings = BookingService::new(store.clone());
    let draft = draft_for(&bookings, &["A2", "B3"]).await;

    // Кто-то оплатил A2, пока выбор был на экране
    store
        .seed(Collection::Bookings, "BK-RACE", json!({
            "userId": "racer", "scheduleId": SCHEDULE, "seatIds": ["A2"], "status": "paid"
        }))
        .await;

    let mut submission = BookingSubmission::new();
    let err = bookings
        .submit(&mut submission, Some(&viewer()), &draft)
        .await
        .unwrap_err();

    match err {
        BookingError::Conflict { seats } => assert_eq!(seats, vec!["A2".to_string()]),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(store.writes(), 0);
    assert!(matches!(
        submission.state(),
        SubmissionState::Rejected { conflicting, .. } if conflicting == &vec!["A2".to_string()]
    ));
}

#[tokio::test]
async fn half_of_double_seat_counts_as_conflict() {
    let store = seeded_store().await;
    store
        .seed(Collection::Bookings, "BK-HALF", json!({
            "userId": "legacy", "scheduleId": SCHEDULE, "seatIds": ["A4"], "status": "paid"
        }))
        .await;
    let bookings = BookingService::new(store.clone());

    let err = bookings
        .book_seats(Some(&viewer()), SCHEDULE, &["A3-4".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Conflict { ref seats } if seats == &vec!["A3-4".to_string()]));
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn successful_submission_writes_exactly_once() {
    let store = seeded_store().await;
    let bookings = BookingService::new(store.clone());
    let user = viewer();

    let booking = bookings
        .book_seats(Some(&user), SCHEDULE, &["B2".to_string(), "B3".to_string()])
        .await
        .unwrap();

    assert_eq!(store.writes(), 1);
    assert_eq!(booking.seat_ids, vec!["B2".to_string(), "B3".to_string()]);
    assert_eq!(booking.total_price, 200_000);
    assert_eq!(booking.status, "paid");

    let mine = bookings.user_bookings(&user.uid).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, booking.id);
}

#[tokio::test]
async fn sign_in_and_booking_info_are_required() {
    let store = seeded_store().await;
    let bookings = BookingService::new(store.clone());
    let draft = draft_for(&bookings, &["A2"]).await;

    let mut submission = BookingSubmission::new();
    let err = bookings.submit(&mut submission, None, &draft).await.unwrap_err();
    assert!(matches!(err, BookingError::MustSignIn));
    assert_eq!(err.to_string(), "must sign in");

    let mut submission = BookingSubmission::new();
    let err = bookings
        .submit(&mut submission, Some(&viewer()), &BookingDraft::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::MissingBookingInfo));
    assert_eq!(err.to_string(), "missing booking information");

    let empty = draft_for(&bookings, &[]).await;
    let mut submission = BookingSubmission::new();
    let err = bookings
        .submit(&mut submission, Some(&viewer()), &empty)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NoSeatsSelected));

    let err = bookings
        .book_seats(None, SCHEDULE, &["A2".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::MustSignIn));

    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn unknown_seats_and_missing_schedule() {
    let store = seeded_store().await;
    let bookings = BookingService::new(store.clone());
    let user = viewer();

    let err = bookings
        .book_seats(Some(&user), SCHEDULE, &["Z9".to_string(), "A2".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::UnknownSeats { ref seats } if seats == &vec!["Z9".to_string()]));

    let err = bookings
        .book_seats(Some(&user), "no-such-schedule", &["A2".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::MissingBookingInfo));
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn backend_failure_is_reported_and_retry_is_explicit() {
    let store = seeded_store().await;
    let bookings = BookingService::new(store.clone());
    let user = viewer();
    let draft = draft_for(&bookings, &["B4"]).await;
    let mut submission = BookingSubmission::new();

    store.fail_writes(true);
    let err = bookings
        .submit(&mut submission, Some(&user), &draft)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Store(StoreError::Unavailable(_))));
    assert!(matches!(submission.state(), SubmissionState::Rejected { .. }));
    assert_eq!(store.writes(), 0);

    // Автоматического повтора нет; пользователь отправляет снова
    store.fail_writes(false);
    let booking = bookings
        .submit(&mut submission, Some(&user), &draft)
        .await
        .unwrap();
    assert_eq!(booking.seat_ids, vec!["B4".to_string()]);
    assert_eq!(store.writes(), 1);

    let err = bookings
        .submit(&mut submission, Some(&user), &draft)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::AlreadySaved));
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn quote_matches_submitted_price() {
    let store = seeded_store().await;
    let bookings = BookingService::new(store);
    let seats = vec!["A2".to_string(), "A3-4".to_string()];

    let quote = bookings.quote(SCHEDULE, &seats).await.unwrap();
    assert_eq!(quote.total_price, 330_000);

    let booking = bookings.book_seats(Some(&viewer()), SCHEDULE, &seats).await.unwrap();
    assert_eq!(booking.total_price, quote.total_price);
}
