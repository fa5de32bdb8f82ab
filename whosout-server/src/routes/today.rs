//! Absence report endpoint

use axum::{Json, Router, extract::State, routing::get};

use whosout_core::TodayData;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(today))
}

/// GET / - Who is out over the next configured workdays
async fn today(State(state): State<AppState>) -> Result<Json<TodayData>, AppError> {
    let calendar = state.projector.today(state.workdays).await?;
    Ok(Json(TodayData { calendar }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use whosout_core::FeedConfig;

    const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:daily\r\n\
SUMMARY:Jane Doe - Holiday\r\n\
DTSTART;VALUE=DATE:20200101\r\n\
DTEND;VALUE=DATE:20200102\r\n\
RRULE:FREQ=DAILY\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn state_for(url: String) -> AppState {
        let config: FeedConfig = serde_json::from_value(serde_json::json!({
            "calendar_url": url,
            "refresh_interval": "1h",
            "workdays": 5,
        }))
        .unwrap();
        AppState::new(&config).unwrap()
    }

    async fn get_root(state: AppState) -> (StatusCode, serde_json::Value) {
        let response = router()
            .with_state(state)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_reports_five_workdays() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/calendar.ics")
            .with_status(200)
            .with_body(FEED)
            .expect(1)
            .create_async()
            .await;

        let state = state_for(format!("{}/calendar.ics", server.url()));
        let (status, body) = get_root(state.clone()).await;

        assert_eq!(status, StatusCode::OK);
        let calendar = body["Calendar"].as_object().expect("Calendar object");
        assert_eq!(calendar.len(), 5);
        for day in calendar.values() {
            assert_eq!(day["Holiday"], serde_json::json!(["Jane Doe"]));
        }

        // Second request inside the refresh interval is served from cache.
        let (status, _) = get_root(state).await;
        assert_eq!(status, StatusCode::OK);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_feed_still_answers() {
        let state = state_for("http://127.0.0.1:1/calendar.ics".to_string());
        let (status, body) = get_root(state).await;

        assert_eq!(status, StatusCode::OK);
        let calendar = body["Calendar"].as_object().expect("Calendar object");
        assert_eq!(calendar.len(), 5);
        assert!(calendar.values().all(|day| day.as_object().is_some_and(|d| d.is_empty())));
    }

    #[tokio::test]
    async fn test_malformed_feed_is_a_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/calendar.ics")
            .with_status(200)
            .with_body("<html>not a calendar</html>")
            .create_async()
            .await;

        let state = state_for(format!("{}/calendar.ics", server.url()));
        let (status, body) = get_root(state).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().is_some_and(|e| e.contains("ICS parse error")));
    }
}
