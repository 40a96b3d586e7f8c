use tokio::time::interval;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test]
async fn scratch_where_parked() {
    let (_tx, mut rx) = mpsc::unbounded_channel::<u8>();
    let task = tokio::spawn(async move {
        eprintln!("[task start]");
        let mut window = interval(Duration::from_secs(2));
        eprintln!("[before first tick]");
        window.tick().await;
        eprintln!("[after first tick]");
        loop {
            tokio::select! {
                _ = window.tick() => {}
                read = rx.recv() => { if read.is_none() { break; } }
            }
        }
    });
    for _ in 0..50 { tokio::task::yield_now().await; }
    eprintln!("[after 50 yields]");
    tokio::time::sleep(Duration::from_millis(5)).await;
    eprintln!("[after real sleep]");
    task.abort();
}
