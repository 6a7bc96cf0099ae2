#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{DateTime, Duration, Utc};
    use serde_json::{json, Value};

    use crate::tests::support::{id_of, spawn_app, TestApp};

    fn date(value: &Value) -> DateTime<Utc> {
        value.as_str().unwrap().parse::<DateTime<Utc>>().unwrap()
    }

    async fn friend(app: &TestApp, token: &str, first_name: &str) -> String {
        let (status, body) = app.post("/api/friend", token, json!({ "friend": { "first_name": first_name } })).await;
        assert_eq!(status, StatusCode::CREATED);
        id_of(&body, "friend_id")
    }

    #[tokio::test]
    async fn test_event_defaults_and_validation() {
        let app = spawn_app().await;
        let token = app.register("ann@example.com").await;

        let (status, body) = app
            .post(
                "/api/event",
                &token,
                json!({ "title": "Dinner", "start_date": "2030-05-01T18:00:00Z", "frequency": "once" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = id_of(&body, "event_id");

        let (status, body) = app.get(&format!("/api/event/{}", id), &token).await;
        assert_eq!(status, StatusCode::OK);
        let event = &body["event"];
        assert_eq!(event["frequency"], "once");
        assert_eq!(date(&event["end_date"]) - date(&event["start_date"]), Duration::minutes(5));

        let (status, body) = app
            .post(
                "/api/event",
                &token,
                json!({ "title": "Dinner", "start_date": "2030-05-01T18:00:00Z", "frequency": "fortnightly" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = app
            .post("/api/event", &token, json!({ "start_date": "2030-05-01T18:00:00Z", "frequency": "once" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .put(&format!("/api/event/{}", id), &token, json!({ "frequency": "sometimes" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .put(&format!("/api/event/{}", id), &token, json!({ "title": "Late dinner", "frequency": "weekly" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = app.get(&format!("/api/event/{}", id), &token).await;
        assert_eq!(body["event"]["title"], "Late dinner");
        assert_eq!(body["event"]["frequency"], "weekly");

        let (_, body) = app.get("/api/event", &token).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        assert_eq!(app.delete(&format!("/api/event/{}", id), &token).await.0, StatusCode::OK);
        assert_eq!(app.get(&format!("/api/event/{}", id), &token).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_event_attendees_and_reminders() {
        let app = spawn_app().await;
        let token = app.register("ann@example.com").await;
        let lea = friend(&app, &token, "Lea").await;
        let max = friend(&app, &token, "Max").await;
        let kim = friend(&app, &token, "Kim").await;

        let (status, body) = app
            .post(
                "/api/event",
                &token,
                json!({
                    "title": "Climbing",
                    "start_date": "2030-06-01T10:00:00Z",
                    "end_date": "2030-06-01T12:00:00Z",
                    "frequency": "weekly",
                    "friend_ids": [{ "friend_id": lea }, { "friend_id": max }],
                    "reminders": [{ "minutes_until_event": 60 }]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = id_of(&body, "event_id");

        let (_, body) = app.get(&format!("/api/event/{}/full", id), &token).await;
        let full = &body["event"];
        assert_eq!(full["friends"].as_array().unwrap().len(), 2);
        assert_eq!(full["reminders"][0]["minutes_until_event"], 60);
        assert_eq!(full["reminders"][0]["is_active"], true);

        let (status, body) = app
            .post(&format!("/api/event/{}/friends", id), &token, json!([{ "friend_id": kim }]))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["ids"].as_array().unwrap().len(), 1);

        let (status, body) = app
            .post(&format!("/api/event/{}/friends", id), &token, json!([{ "friend_id": lea }]))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");

        let (status, body) = app
            .post(
                &format!("/api/event/{}/reminders", id),
                &token,
                json!([{ "minutes_until_event": 10 }, { "minutes_until_event": 1440, "is_active": false }]),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["ids"].as_array().unwrap().len(), 2);

        let (_, body) = app.get(&format!("/api/event/{}/friends", id), &token).await;
        assert_eq!(body["event"]["friends"].as_array().unwrap().len(), 3);

        let (status, _) = app
            .call(
                axum::http::Method::DELETE,
                &format!("/api/event/{}/friends", id),
                Some(&token),
                Some(json!({ "friend_ids": [max] })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        // Removing a friend that no longer attends changes nothing
        let (status, _) = app
            .call(
                axum::http::Method::DELETE,
                &format!("/api/event/{}/friends", id),
                Some(&token),
                Some(json!({ "friend_ids": [lea, max] })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = app.get(&format!("/api/event/{}/full", id), &token).await;
        let names: Vec<&str> = body["event"]["friends"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["first_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Lea", "Kim"]);
        assert_eq!(body["event"]["reminders"].as_array().unwrap().len(), 3);

        let (_, body) = app.get(&format!("/api/event/friend/{}", kim), &token).await;
        assert_eq!(body["data"][0]["id"], id.as_str());
        let (_, body) = app.get(&format!("/api/event/friend/{}", max), &token).await;
        assert!(body["data"].as_array().unwrap().is_empty());

        let (_, body) = app.get("/api/reminder", &token).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 3);

        // Deleting the event removes its reminders
        app.delete(&format!("/api/event/{}", id), &token).await;
        let (_, body) = app.get("/api/reminder", &token).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_event_full_update_replaces_collections() {
        let app = spawn_app().await;
        let token = app.register("ann@example.com").await;
        let lea = friend(&app, &token, "Lea").await;
        let max = friend(&app, &token, "Max").await;

        let (_, body) = app
            .post(
                "/api/event",
                &token,
                json!({
                    "title": "Board games",
                    "start_date": "2030-01-10T19:00:00Z",
                    "frequency": "monthlyDay",
                    "friend_ids": [{ "friend_id": lea }],
                    "reminders": [{ "minutes_until_event": 30 }, { "minutes_until_event": 5 }]
                }),
            )
            .await;
        let id = id_of(&body, "event_id");

        let (status, _) = app
            .put(
                &format!("/api/event/{}/full", id),
                &token,
                json!({
                    "event": { "description": "bring snacks" },
                    "friend_ids": [{ "friend_id": max }],
                    "reminders": [{ "minutes_until_event": 120 }]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = app.get(&format!("/api/event/{}/full", id), &token).await;
        let full = &body["event"];
        assert_eq!(full["event"]["title"], "Board games");
        assert_eq!(full["event"]["description"], "bring snacks");
        assert_eq!(full["friends"].as_array().unwrap().len(), 1);
        assert_eq!(full["friends"][0]["id"], max.as_str());
        assert_eq!(full["reminders"].as_array().unwrap().len(), 1);
        assert_eq!(full["reminders"][0]["minutes_until_event"], 120);

        // Omitted collections stay untouched, an empty list clears
        app.put(&format!("/api/event/{}/full", id), &token, json!({ "reminders": [] })).await;
        let (_, body) = app.get(&format!("/api/event/{}/full", id), &token).await;
        assert_eq!(body["event"]["friends"].as_array().unwrap().len(), 1);
        assert!(body["event"]["reminders"].as_array().unwrap().is_empty());

        let (_, body) = app.get("/api/event/full", &token).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        let (_, body) = app.get("/api/event/friends", &token).await;
        assert_eq!(body["data"][0]["friends"][0]["first_name"], "Max");
    }

    #[tokio::test]
    async fn test_friend_with_birthday_gets_annual_event() {
        let app = spawn_app().await;
        let token = app.register("ann@example.com").await;
        let before = Utc::now();

        let (status, body) = app
            .post(
                "/api/friend",
                &token,
                json!({
                    "friend": { "first_name": "Ann", "last_name": "Lee", "dob": "1990-03-14T09:30:00Z" },
                    "work_info": { "city": "Oslo" }
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let friend_id = id_of(&body, "friend_id");
        let event_id = id_of(&body, "event_id");

        let (status, body) = app.get(&format!("/api/event/{}/full", event_id), &token).await;
        assert_eq!(status, StatusCode::OK);
        let full = &body["event"];
        assert_eq!(full["event"]["title"], "Birthday: Ann Lee");
        assert_eq!(full["event"]["description"], "Oslo");
        assert_eq!(full["event"]["frequency"], "annually");

        let start = date(&full["event"]["start_date"]);
        let end = date(&full["event"]["end_date"]);
        assert_eq!(end - start, Duration::minutes(5));
        assert!(start >= before - Duration::minutes(1));
        assert!(start <= before + Duration::days(366));
        assert_eq!(start.format("%m-%d %H:%M").to_string(), "03-14 09:30");

        assert_eq!(full["friends"].as_array().unwrap().len(), 1);
        assert_eq!(full["friends"][0]["id"], friend_id.as_str());
        assert_eq!(full["reminders"].as_array().unwrap().len(), 1);
        assert_eq!(full["reminders"][0]["minutes_until_event"], 0);

        let (_, body) = app.get(&format!("/api/event/friend/{}", friend_id), &token).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_friend_without_birthday_has_no_event() {
        let app = spawn_app().await;
        let token = app.register("ann@example.com").await;

        let (status, body) = app.post("/api/friend", &token, json!({ "friend": { "first_name": "Bo" } })).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.get("event_id").is_none());

        let (_, body) = app.get("/api/event", &token).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reminder_crud() {
        let app = spawn_app().await;
        let ann = app.register("ann@example.com").await;
        let bob = app.register("bob@example.com").await;

        let (_, body) = app
            .post("/api/event", &ann, json!({ "title": "Call", "start_date": "2030-02-02T08:00:00Z", "frequency": "everyday" }))
            .await;
        let event_id = id_of(&body, "event_id");

        let (status, body) = app
            .post("/api/reminder", &ann, json!({ "event_id": event_id, "minutes_until_event": 15 }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let reminder_id = id_of(&body, "reminder_id");

        let uri = format!("/api/reminder/{}", reminder_id);
        let (_, body) = app.get(&uri, &ann).await;
        assert_eq!(body["reminder"]["minutes_until_event"], 15);
        assert_eq!(body["reminder"]["is_active"], true);

        app.put(&uri, &ann, json!({ "is_active": false })).await;
        let (_, body) = app.get(&uri, &ann).await;
        assert_eq!(body["reminder"]["is_active"], false);
        assert_eq!(body["reminder"]["minutes_until_event"], 15);

        let (_, body) = app.get(&format!("/api/reminder/event/{}", event_id), &ann).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        // Another user can neither read nor attach to the event
        assert_eq!(app.get(&uri, &bob).await.0, StatusCode::NOT_FOUND);
        let (status, _) = app
            .post("/api/reminder", &bob, json!({ "event_id": event_id, "minutes_until_event": 1 }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(app.get(&format!("/api/reminder/event/{}", event_id), &bob).await.0, StatusCode::NOT_FOUND);

        assert_eq!(app.delete(&uri, &ann).await.0, StatusCode::OK);
        assert_eq!(app.delete(&uri, &ann).await.0, StatusCode::NOT_FOUND);
    }
}
