// ABOUTME: Demo of cooperative coroutine scheduling on stdout.
// ABOUTME: Drives two combined coroutines, then two mutually-referencing ones.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{Stream, StreamExt};
use weave::prelude::*;

fn progress(tag: char, steps: usize) -> impl Stream<Item = Result<String, WeaveError>> {
    futures::stream::iter((0..steps).map(move |i| Ok(format!("{tag}: {}", "#".repeat(i + 1)))))
}

async fn combined_demo() -> anyhow::Result<()> {
    println!("-- combined coroutines, one step per tick --");

    let driver = Driver::new(Duration::from_millis(25));
    let cancel = CancelSignal::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            cancel.cancel();
        }
    });

    let mut sink = |line: String| println!("{line}");
    driver
        .run(|| vec![progress('A', 20), progress('B', 20)], &mut sink, cancel)
        .await?;
    Ok(())
}

async fn mutual_demo() -> anyhow::Result<()> {
    println!("-- mutual coroutines via proxies --");

    let proxy_a = Arc::new(CoroutineProxy::<usize>::new());
    let proxy_b = Arc::new(CoroutineProxy::<usize>::new());
    let cancel = CancelSignal::new();

    // A spins while B advances 5 steps, then runs on its own.
    let run_a = {
        let peer = Arc::clone(&proxy_b);
        let proxy = Arc::clone(&proxy_a);
        let cancel = cancel.clone();
        async move {
            proxy
                .run(
                    move |_cancel| {
                        async_stream::stream! {
                            let peer_stream =
                                match peer.resolve(std::future::pending::<()>()).await {
                                    Ok(stream) => stream,
                                    Err(err) => {
                                        yield Err(anyhow::Error::new(err));
                                        return;
                                    }
                                };
                            tokio::pin!(peer_stream);

                            while let Some(step) = peer_stream.next().await {
                                let step = match step {
                                    Ok(step) => step,
                                    Err(err) => {
                                        yield Err(anyhow::Error::new(err));
                                        return;
                                    }
                                };
                                println!("A: waiting on B ({step})");
                                if step >= 5 {
                                    break;
                                }
                            }

                            let pacer = Pacer::new();
                            for i in 0..10 {
                                let _ = pacer
                                    .wait(Duration::from_millis(25), std::future::pending::<()>())
                                    .await;
                                println!("A: step {i}");
                                yield Ok(i);
                            }
                        }
                    },
                    cancel,
                )
                .await
        }
    };

    let run_b = {
        let proxy = Arc::clone(&proxy_b);
        let cancel = cancel.clone();
        async move {
            proxy
                .run(
                    move |_cancel| {
                        async_stream::stream! {
                            let pacer = Pacer::new();
                            for i in 0..10 {
                                let _ = pacer
                                    .wait(Duration::from_millis(25), std::future::pending::<()>())
                                    .await;
                                println!("B: step {i}");
                                yield Ok(i);
                            }
                        }
                    },
                    cancel,
                )
                .await
        }
    };

    let (a, b) = tokio::join!(run_a, run_b);
    a?;
    b?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    combined_demo().await?;
    mutual_demo().await?;
    Ok(())
}
