// Server-sent events: latest snapshots first, then every update
use crate::application::snapshot::DashboardEvent;
use crate::presentation::app_state::AppState;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

pub async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let store = state.service.store().clone();
    // subscribe before reading the snapshots so nothing published in between is lost
    let mut rx = store.subscribe();
    let readings = store.readings().await;
    let series = store.series().await;
    tracing::debug!("Event stream opened ({} viewers)", store.viewer_count());

    let stream = async_stream::stream! {
        let initial = readings
            .map(DashboardEvent::Readings)
            .into_iter()
            .chain(series.map(DashboardEvent::Series));
        for event in initial {
            if let Some(sse) = to_sse(&event) {
                yield Ok::<Event, Infallible>(sse);
            }
        }

        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(sse) = to_sse(&event) {
                        yield Ok::<Event, Infallible>(sse);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Event stream lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn to_sse(event: &DashboardEvent) -> Option<Event> {
    match Event::default().event(event.name()).json_data(event) {
        Ok(sse) => Some(sse),
        Err(e) => {
            tracing::warn!("Failed to encode {} event: {}", event.name(), e);
            None
        }
    }
}
