use crate::models::{Seat, SeatRowDeclaration, SeatType};

use super::{SeatMatrix, SeatRow};

/// Разворачивает объявления рядов в матрицу мест (все места свободны).
/// Ряды, в которых не получилось ни одного места, пропускаются.
pub fn decode_layout(declarations: &[SeatRowDeclaration]) -> SeatMatrix {
    let rows = declarations
        .iter()
        .filter_map(|decl| {
            let seats = decode_row(decl);
            if seats.is_empty() {
                None
            } else {
                Some(SeatRow { label: decl.row.clone(), seats })
            }
        })
        .collect();
    SeatMatrix::new(rows)
}

/// Один ряд.
///
/// Без "double": место на каждый тег, номера 1..N.
/// С "double": обычные места сохраняют свою позицию, двойных мест
/// (число тегов double) / 2, номера "n-(n+1)" начиная с позиции первого
/// тега double. Непарный тег double теряется. В конце ряд сортируется
/// по первому числу номера.
///
/// Нумерация двойных идёт подряд от первого double и не смотрит на
/// обычные места между ними: [standard, double, double, standard, double,
/// double] даёт A1, A2-3, A4, A4-5. Половинка A4-5 совпадает с обычным A4,
/// поэтому оплаченное A4 занимает и A4-5.
pub fn decode_row(decl: &SeatRowDeclaration) -> Vec<Seat> {
    let row = decl.row.as_str();
    let types: Vec<SeatType> = decl.types.iter().map(|t| SeatType::from_tag(t)).collect();

    let Some(first_double) = types.iter().position(|t| *t == SeatType::Double) else {
        return types
            .iter()
            .enumerate()
            .map(|(i, t)| Seat::new(row, (i + 1).to_string(), *t))
            .collect();
    };

    let mut seats: Vec<Seat> = types
        .iter()
        .enumerate()
        .filter(|(_, t)| **t != SeatType::Double)
        .map(|(i, t)| Seat::new(row, (i + 1).to_string(), *t))
        .collect();

    let pairs = types.iter().filter(|t| **t == SeatType::Double).count() / 2;
    let start = first_double + 1;
    for k in 0..pairs {
        let n = start + 2 * k;
        seats.push(Seat::new(row, format!("{}-{}", n, n + 1), SeatType::Double));
    }

    // sort_by_key стабилен: при равных номерах порядок выпуска сохраняется
    seats.sort_by_key(Seat::first_number);
    seats
}
