//! Справочные запросы каталога: фильмы, сеансы по дням, кинотеатры.
//!
//! Отсутствующие документы (зал, кинотеатр) не ошибка: такой сеанс просто
//! пропускается. Нераспознанное время сеанса - ошибка.

use chrono::{NaiveDate, NaiveDateTime};
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::CacheService;
use crate::models::{Movie, MovieStatus, Room, Schedule, Theater};
use crate::store::{self, Collection, DocumentStore, Filter, StoreError};
use crate::timefmt::{self, TimeParseError};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("schedule {schedule_id} has a malformed timestamp: {source}")]
    MalformedTimestamp {
        schedule_id: String,
        #[source]
        source: TimeParseError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowtimeSlot {
    pub schedule_id: String,
    pub room_id: String,
    pub room_name: String,
    pub screen_type: String,
    pub starts_at: String,
    pub ends_at: Option<String>,
    pub price: i64,
    pub available_seats: u32,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TheaterShowtimes {
    pub theater: Theater,
    pub showtimes: Vec<ShowtimeSlot>,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
    cache: Option<CacheService>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>, cache: Option<CacheService>) -> Self {
        Self { store, cache }
    }

    pub async fn movies_by_status(&self, status: MovieStatus) -> Result<Vec<Movie>, CatalogError> {
        if let Some(cache) = &self.cache {
            if let Some(movies) = cache.get_movies(status).await {
                return Ok(movies);
            }
        }

        // Статус нормализуется при декодировании, фильтруем после
        let mut movies: Vec<Movie> =
            store::fetch_all(self.store.as_ref(), Collection::Movies, &[]).await?;
        movies.retain(|m| m.status == status);
        movies.sort_by(|a, b| a.title.cmp(&b.title));

        if let Some(cache) = &self.cache {
            cache.save_movies(status, &movies).await;
        }
        Ok(movies)
    }

    pub async fn movie(&self, id: &str) -> Result<Option<Movie>, CatalogError> {
        Ok(store::fetch(self.store.as_ref(), Collection::Movies, id).await?)
    }

    pub async fn schedules_by_movie_and_date(
        &self,
        movie_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Schedule>, CatalogError> {
        let mut dated = Vec::new();
        for (starts_at, schedule) in self.timed_schedules(movie_id).await? {
            if starts_at.date() == date {
                dated.push((starts_at, schedule));
            }
        }
        dated.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(dated.into_iter().map(|(_, s)| s).collect())
    }

    /// Даты, на которые у фильма есть сеансы, по возрастанию.
    pub async fn available_dates(
        &self,
        movie_id: &str,
        from: Option<NaiveDate>,
    ) -> Result<Vec<NaiveDate>, CatalogError> {
        let dates: BTreeSet<NaiveDate> = self
            .timed_schedules(movie_id)
            .await?
            .into_iter()
            .map(|(starts_at, _)| starts_at.date())
            .filter(|d| from.map_or(true, |from| *d >= from))
            .collect();
        Ok(dates.into_iter().collect())
    }

    pub async fn theaters_with_showtimes(
        &self,
        movie_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<TheaterShowtimes>, CatalogError> {
        let schedules = self.schedules_by_movie_and_date(movie_id, date).await?;
        if schedules.is_empty() {
            return Ok(Vec::new());
        }

        let room_ids: BTreeSet<&str> = schedules.iter().map(|s| s.room_id.as_str()).collect();
        let rooms = self.fetch_many::<Room>(Collection::Rooms, room_ids).await?;

        let theater_ids: BTreeSet<&str> = rooms.values().map(|r| r.theater_id.as_str()).collect();
        let theaters = self.fetch_many::<Theater>(Collection::Theaters, theater_ids).await?;

        let mut grouped: BTreeMap<String, TheaterShowtimes> = BTreeMap::new();
        for schedule in &schedules {
            let Some(room) = rooms.get(&schedule.room_id) else {
                debug!("Schedule {} references missing room {}", schedule.id, schedule.room_id);
                continue;
            };
            let Some(theater) = theaters.get(&room.theater_id) else {
                debug!("Room {} references missing theater {}", room.id, room.theater_id);
                continue;
            };

            let slot = showtime_slot(schedule, room)?;
            grouped
                .entry(theater.id.clone())
                .or_insert_with(|| TheaterShowtimes {
                    theater: theater.clone(),
                    showtimes: Vec::new(),
                })
                .showtimes
                .push(slot);
        }

        // Сеансы уже отсортированы по началу
        let mut result: Vec<TheaterShowtimes> = grouped.into_values().collect();
        result.sort_by(|a, b| a.theater.name.cmp(&b.theater.name));
        Ok(result)
    }

    pub async fn theaters(&self) -> Result<Vec<Theater>, CatalogError> {
        if let Some(cache) = &self.cache {
            if let Some(theaters) = cache.get_theaters().await {
                return Ok(theaters);
            }
        }

        let mut theaters: Vec<Theater> =
            store::fetch_all(self.store.as_ref(), Collection::Theaters, &[]).await?;
        theaters.sort_by(|a, b| a.name.cmp(&b.name));

        if let Some(cache) = &self.cache {
            cache.save_theaters(&theaters).await;
        }
        Ok(theaters)
    }

    async fn timed_schedules(
        &self,
        movie_id: &str,
    ) -> Result<Vec<(NaiveDateTime, Schedule)>, CatalogError> {
        let schedules: Vec<Schedule> = store::fetch_all(
            self.store.as_ref(),
            Collection::Schedules,
            &[Filter::eq("movieId", movie_id)],
        )
        .await?;

        schedules
            .into_iter()
            .map(|schedule| match schedule.starts_at() {
                Ok(starts_at) => Ok((starts_at, schedule)),
                Err(source) => {
                    warn!("Schedule {} has unparseable start time '{}'", schedule.id, schedule.start_time);
                    Err(CatalogError::MalformedTimestamp { schedule_id: schedule.id, source })
                }
            })
            .collect()
    }

    /// Параллельно читает документы по id; отсутствующие пропускаются.
    async fn fetch_many<T>(
        &self,
        collection: Collection,
        ids: BTreeSet<&str>,
    ) -> Result<HashMap<String, T>, StoreError>
    where
        T: serde::de::DeserializeOwned,
    {
        let docs = self.store.as_ref();
        let found = try_join_all(ids.into_iter().map(|id| async move {
            store::fetch::<T>(docs, collection, id)
                .await
                .map(|doc| doc.map(|d| (id.to_string(), d)))
        }))
        .await?;
        Ok(found.into_iter().flatten().collect())
    }
}

fn showtime_slot(schedule: &Schedule, room: &Room) -> Result<ShowtimeSlot, CatalogError> {
    let malformed = |source| CatalogError::MalformedTimestamp {
        schedule_id: schedule.id.clone(),
        source,
    };
    let starts_at = schedule.starts_at().map_err(malformed)?;
    let ends_at = schedule.ends_at().map_err(malformed)?;

    Ok(ShowtimeSlot {
        schedule_id: schedule.id.clone(),
        room_id: room.id.clone(),
        room_name: room.name.clone(),
        screen_type: room.screen_type.clone(),
        starts_at: timefmt::format_timestamp(&starts_at),
        ends_at: ends_at.as_ref().map(timefmt::format_timestamp),
        price: schedule.price,
        available_seats: schedule.available_seats,
        language: schedule.language.clone(),
    })
}
