use std::collections::HashSet;

use crate::models::{Booking, Seat, SeatStatus};

use super::{SeatMatrix, SeatRow};

/// Идентификаторы мест из оплаченных броней одного сеанса.
/// Не хранится, пересчитывается при каждой загрузке и перед оформлением.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancySet {
    ids: HashSet<String>,
}

impl OccupancySet {
    pub fn from_bookings<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> Self {
        let ids = bookings
            .into_iter()
            .filter(|b| b.is_paid())
            .flat_map(|b| b.seat_ids.iter().cloned())
            .collect();
        Self { ids }
    }

    pub fn contains(&self, seat_id: &str) -> bool {
        self.ids.contains(seat_id)
    }

    /// Место занято, если занят его id, а для двойного - любая половинка.
    pub fn occupies(&self, seat: &Seat) -> bool {
        self.contains(&seat.id) || seat.sub_ids().iter().any(|id| self.contains(id))
    }

    /// Какие из выбранных мест уже заняты.
    pub fn conflicts<'a>(&self, selected: impl IntoIterator<Item = &'a Seat>) -> Vec<String> {
        selected
            .into_iter()
            .filter(|seat| self.occupies(seat))
            .map(|seat| seat.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for OccupancySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { ids: iter.into_iter().map(Into::into).collect() }
    }
}

/// Помечает занятые места как booked. Чистая функция, без I/O.
/// Занятые id, которым не нашлось места в матрице, молча игнорируются.
pub fn merge_occupancy(matrix: &SeatMatrix, occupied: &OccupancySet) -> SeatMatrix {
    let rows = matrix
        .rows
        .iter()
        .map(|row| SeatRow {
            label: row.label.clone(),
            seats: row
                .seats
                .iter()
                .map(|seat| {
                    if occupied.occupies(seat) {
                        Seat { status: SeatStatus::Booked, ..seat.clone() }
                    } else {
                        seat.clone()
                    }
                })
                .collect(),
        })
        .collect();
    SeatMatrix::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SeatRowDeclaration, SeatType};
    use crate::seating::decode_layout;

    fn booking(status: &str, seats: &[&str]) -> Booking {
        Booking {
            id: "BK1".into(),
            user_id: "u1".into(),
            movie_id: "m1".into(),
            schedule_id: "s1".into(),
            room_id: "r1".into(),
            seat_ids: seats.iter().map(|s| s.to_string()).collect(),
            total_price: 0,
            created_at: None,
            status: status.into(),
        }
    }

    #[test]
    fn only_paid_bookings_count() {
        let bookings = vec![booking("paid", &["A1", "A2"]), booking("cancelled", &["B1"])];
        let set = OccupancySet::from_bookings(&bookings);
        assert!(set.contains("A1"));
        assert!(set.contains("A2"));
        assert!(!set.contains("B1"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn marks_exact_and_half_matches() {
        let matrix = decode_layout(&[SeatRowDeclaration::new(
            "A",
            ["standard", "standard", "double", "double", "double", "double"],
        )]);
        // A3-4 занят целиком, у A5-6 записана только половинка
        let occupied: OccupancySet = ["A3-4", "A6", "Z99"].into_iter().collect();
        let merged = merge_occupancy(&matrix, &occupied);

        let status = |id: &str| merged.find(id).map(|s| s.status);
        assert_eq!(status("A1"), Some(SeatStatus::Available));
        assert_eq!(status("A2"), Some(SeatStatus::Available));
        assert_eq!(status("A3-4"), Some(SeatStatus::Booked));
        assert_eq!(status("A5-6"), Some(SeatStatus::Booked));
        assert_eq!(merged.count_with_status(SeatStatus::Booked), 2);
    }

    #[test]
    fn standard_pair_then_double_with_first_seat_paid() {
        let matrix = decode_layout(&[SeatRowDeclaration::new(
            "A",
            ["standard", "standard", "double", "double"],
        )]);
        let occupied: OccupancySet = ["A1"].into_iter().collect();
        let merged = merge_occupancy(&matrix, &occupied);

        let seats: Vec<_> = merged
            .seats()
            .map(|s| (s.id.as_str(), s.seat_type, s.status))
            .collect();
        assert_eq!(
            seats,
            vec![
                ("A1", SeatType::Standard, SeatStatus::Booked),
                ("A2", SeatType::Standard, SeatStatus::Available),
                ("A3-4", SeatType::Double, SeatStatus::Available),
            ]
        );
    }

    #[test]
    fn merge_is_pure() {
        let matrix = decode_layout(&[SeatRowDeclaration::new("A", ["standard", "vip"])]);
        let occupied: OccupancySet = ["A2"].into_iter().collect();
        let first = merge_occupancy(&matrix, &occupied);
        let second = merge_occupancy(&matrix, &occupied);
        assert_eq!(first, second);
        assert_eq!(matrix.count_with_status(SeatStatus::Booked), 0);
    }

    #[test]
    fn conflicts_use_the_same_matching_rule() {
        let matrix = decode_layout(&[SeatRowDeclaration::new(
            "A",
            ["standard", "double", "double"],
        )]);
        let occupied: OccupancySet = ["A2"].into_iter().collect();
        let conflicts = occupied.conflicts(matrix.seats());
        assert_eq!(conflicts, vec!["A2-3".to_string()]);
    }
}
