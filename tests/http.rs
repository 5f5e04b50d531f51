use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, PartialEq, Deserialize)]
struct DailyRecord {
    date: String,
    breakfast: bool,
    lunch: bool,
    dinner: bool,
    gym: bool,
    gym_photo: Option<String>,
    eating_completed: bool,
    completed_all: bool,
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Counter {
    completed_days: u32,
    total_days: u32,
    percentage: f64,
}

#[derive(Debug, Deserialize)]
struct WeeklyProgress {
    eating_progress: Counter,
    gym_progress: Counter,
    overall_progress: f64,
    days: Vec<Value>,
}

#[derive(Debug, PartialEq, Deserialize)]
struct StreakInfo {
    current_streak: u32,
    longest_streak: u32,
    total_perfect_days: u32,
    last_perfect_day: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    today: DailyRecord,
    weekly: WeeklyProgress,
    monthly: Value,
    streak: StreakInfo,
}

#[derive(Debug, Deserialize)]
struct ExerciseProgress {
    exercise_name: String,
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct WorkoutSession {
    day: u32,
    exercises: Vec<ExerciseProgress>,
    completion_percentage: f64,
    completed: bool,
    status: String,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_dir() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("habit_tracker_http_{}_{}", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/today")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_dir = unique_data_dir();
    let child = Command::new(env!("CARGO_BIN_EXE_habit_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_DIR", data_dir)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn patch_habit(
    client: &Client,
    base_url: &str,
    date: &str,
    body: Value,
) -> reqwest::Response {
    client
        .patch(format!("{base_url}/api/habits/{date}"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

async fn get_habit(client: &Client, base_url: &str, date: &str) -> DailyRecord {
    client
        .get(format!("{base_url}/api/habits/{date}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_unknown_date_returns_defaults() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let record = get_habit(&client, &server.base_url, "2020-01-01").await;
    assert_eq!(record.date, "2020-01-01");
    assert!(!record.breakfast && !record.lunch && !record.dinner && !record.gym);
    assert!(!record.completed_all);
    assert!(record.updated_at.is_none());
}

#[tokio::test]
async fn http_patch_then_get_round_trips() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let date = "2021-06-15";

    let body = json!({ "breakfast": true });
    let response = patch_habit(&client, &server.base_url, date, body).await;
    assert!(response.status().is_success());

    let updated: DailyRecord = patch_habit(
        &client,
        &server.base_url,
        date,
        json!({
            "lunch": true,
            "dinner": true,
            "gym": true,
            "gym_photo": "data:image/jpeg;base64,AAAA",
        }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert!(updated.eating_completed);
    assert!(updated.completed_all);

    let fetched = get_habit(&client, &server.base_url, date).await;
    assert_eq!(fetched, updated);

    let listed: Vec<DailyRecord> = client
        .get(format!("{}/api/habits", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.iter().any(|record| record == &updated));
    assert!(listed.windows(2).all(|pair| pair[0].date > pair[1].date));
}

#[tokio::test]
async fn http_invalid_updates_are_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let date = "2021-07-01";

    patch_habit(&client, &server.base_url, date, json!({ "breakfast": true })).await;
    let before = get_habit(&client, &server.base_url, date).await;

    let body = json!({ "lunch": true, "snack": true });
    let unknown = patch_habit(&client, &server.base_url, date, body).await;
    assert_eq!(unknown.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = unknown.json().await.unwrap();
    assert!(body["detail"].is_string());

    let body = json!({ "lunch": true });
    let bad_date = patch_habit(&client, &server.base_url, "2021-13-01", body).await;
    assert_eq!(bad_date.status(), reqwest::StatusCode::BAD_REQUEST);

    assert_eq!(get_habit(&client, &server.base_url, date).await, before);
}

#[tokio::test]
async fn http_weekly_progress_shape() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let weekly: WeeklyProgress = client
        .get(format!("{}/api/progress/weekly", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(weekly.eating_progress.total_days, 7);
    assert_eq!(weekly.gym_progress.total_days, 4);
    assert!(weekly.gym_progress.percentage <= 100.0);
    assert!(weekly.eating_progress.completed_days <= 7);
    let expected = (weekly.eating_progress.percentage + weekly.gym_progress.percentage) / 2.0;
    assert!((weekly.overall_progress - expected).abs() < 1e-9);
    assert_eq!(weekly.days.len(), 7);
}

#[tokio::test]
async fn http_calendar_and_monthly() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let days: Vec<Value> = client
        .get(format!("{}/api/calendar/2024/2", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(days.len(), 29);

    let invalid = client
        .get(format!("{}/api/calendar/2024/13", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status(), reqwest::StatusCode::BAD_REQUEST);

    let monthly: Value = client
        .get(format!("{}/api/progress/monthly?year=2019&month=3", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(monthly["days_elapsed"], 31);
    assert_eq!(monthly["completed_days"], 0);
    assert_eq!(monthly["roadmap"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn http_workout_program() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let workouts: Vec<Value> = client
        .get(format!("{}/api/workout", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(workouts.len(), 5);
    assert_eq!(workouts[4]["trackable"], false);

    let missing = client
        .get(format!("{}/api/workout/9", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_workout_session_toggles() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let url = format!("{}/api/workout-session/2022-03-01/2", server.base_url);

    let session: WorkoutSession = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(session.day, 2);
    assert_eq!(session.status, "not_started");

    let names: Vec<String> = session.exercises.iter().map(|e| e.exercise_name.clone()).collect();
    let mut latest = session;
    for name in &names {
        latest = client
            .patch(format!("{url}/exercise"))
            .json(&json!({ "exercise_name": name, "completed": true }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    }
    assert!(latest.completed);
    assert_eq!(latest.completion_percentage, 100.0);
    assert!(latest.exercises.iter().all(|e| e.completed));

    let reopened: WorkoutSession = client
        .patch(format!("{url}/exercise"))
        .json(&json!({ "exercise_name": names[0], "completed": false }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.status, "in_progress");

    let unknown = client
        .patch(format!("{url}/exercise"))
        .json(&json!({ "exercise_name": "Handstand", "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), reqwest::StatusCode::NOT_FOUND);

    let all: Vec<WorkoutSession> = client
        .get(format!("{}/api/workout-sessions/2022-03-01", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[1].status, "in_progress");
}

#[tokio::test]
async fn http_large_gym_photo_is_accepted() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let date = "2023-01-01";

    // Well past axum's 2 MB default body limit.
    let photo = format!("data:image/jpeg;base64,{}", "A".repeat(3 * 1024 * 1024));
    let body = json!({ "gym": true, "gym_photo": photo });
    let response = patch_habit(&client, &server.base_url, date, body).await;
    assert!(response.status().is_success());

    let fetched = get_habit(&client, &server.base_url, date).await;
    assert!(fetched.gym);
    assert_eq!(fetched.gym_photo.as_deref(), Some(photo.as_str()));
}

#[tokio::test]
async fn http_post_replaces_whole_record() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let date = "2023-02-01";
    let url = format!("{}/api/habits", server.base_url);

    let body = json!({ "breakfast": true, "lunch": true, "dinner": true, "gym": true });
    patch_habit(&client, &server.base_url, date, body).await;

    let created: DailyRecord = client
        .post(&url)
        .json(&json!({ "date": date, "breakfast": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created.date, date);
    assert!(created.breakfast);
    assert!(!created.lunch && !created.dinner && !created.gym);
    assert!(!created.completed_all);
    assert_eq!(get_habit(&client, &server.base_url, date).await, created);

    let blank = client
        .post(&url)
        .json(&json!({ "date": date, "gym": true, "gym_photo": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status(), reqwest::StatusCode::BAD_REQUEST);

    let bad_date = client
        .post(&url)
        .json(&json!({ "date": "2023-02-30" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_date.status(), reqwest::StatusCode::BAD_REQUEST);

    assert_eq!(get_habit(&client, &server.base_url, date).await, created);
}

#[tokio::test]
async fn http_today_streak_and_summary_agree() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let today: DailyRecord = client
        .get(format!("{}/api/today", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let health: Value = client
        .get(format!("{}/api", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["today"], today.date.as_str());

    let body = json!({ "breakfast": true, "lunch": true, "dinner": true, "gym": true });
    let response = patch_habit(&client, &server.base_url, &today.date, body).await;
    assert!(response.status().is_success());

    let streak: StreakInfo = client
        .get(format!("{}/api/progress/streak", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(streak.current_streak >= 1);
    assert!(streak.longest_streak >= streak.current_streak);
    assert!(streak.total_perfect_days >= 1);
    assert_eq!(streak.last_perfect_day.as_deref(), Some(today.date.as_str()));

    let summary: Summary = client
        .get(format!("{}/api/summary", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary.today.date, today.date);
    assert!(summary.today.completed_all);
    assert_eq!(summary.streak, streak);
    assert_eq!(summary.weekly.days.len(), 7);
    assert!(summary.weekly.eating_progress.completed_days >= 1);
    assert!(summary.monthly["completed_days"].as_u64().unwrap() >= 1);
}
