use std::sync::mpsc;
use std::thread;

use engine::{
    Command, Engine, Event, FfmpegMediaBackend, MediaBackend, RenderRequest, ViewerConfig,
};
use iced::futures::channel::oneshot;
use iced::futures::{SinkExt, StreamExt, channel::mpsc as futures_mpsc, executor};
use iced::{Subscription, stream};
use tracing::{debug, warn};

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const EVENT_CHANNEL_CAPACITY: usize = 8;
const SUBSCRIPTION_CHANNEL_CAPACITY: usize = 32;

/// Sender used by the UI thread to dispatch commands to the engine thread.
pub type EngineCommandSender = mpsc::SyncSender<Command>;

/// Receiver used by the UI thread to read events emitted by the engine thread.
pub type EngineEventReceiver = mpsc::Receiver<Event>;

/// Messages emitted by the engine bridge subscription.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    Ready(EngineCommandSender),
    Event(Event),
    Disconnected,
}

/// Builds a subscription that starts the engine bridge and forwards events.
pub fn engine_subscription(config: &ViewerConfig) -> Subscription<BridgeEvent> {
    let config = config.clone();
    Subscription::run_with_id(
        "engine-bridge",
        bridge_worker_stream_with(move || spawn_ffmpeg_bridge(&config)),
    )
}

fn bridge_worker_stream_with<F>(spawn_bridge: F) -> impl iced::futures::Stream<Item = BridgeEvent>
where
    F: FnOnce() -> (EngineCommandSender, EngineEventReceiver) + Send + 'static,
{
    stream::channel(
        SUBSCRIPTION_CHANNEL_CAPACITY,
        move |mut output| async move {
            let (engine_tx, engine_rx) = spawn_bridge();
            let _ = output.send(BridgeEvent::Ready(engine_tx)).await;

            let (forward_tx, mut forward_rx) =
                futures_mpsc::channel::<BridgeEvent>(SUBSCRIPTION_CHANNEL_CAPACITY);

            thread::spawn(move || {
                let mut forward_tx = forward_tx;
                while let Ok(event) = engine_rx.recv() {
                    if executor::block_on(forward_tx.send(BridgeEvent::Event(event))).is_err() {
                        return;
                    }
                }
                let _ = executor::block_on(forward_tx.send(BridgeEvent::Disconnected));
            });

            while let Some(event) = forward_rx.next().await {
                if output.send(event).await.is_err() {
                    break;
                }
            }
        },
    )
}

/// Spawns the production bridge around an FFmpeg-backed render worker.
pub fn spawn_ffmpeg_bridge(config: &ViewerConfig) -> (EngineCommandSender, EngineEventReceiver) {
    spawn_engine_bridge(Engine::new(config), FfmpegMediaBackend)
}

/// Input of the engine thread. `SendersClosed` marks the end of UI commands.
enum Inbound {
    Command(Command),
    SendersClosed,
}

/// Spawns the engine thread and its render worker.
///
/// Render requests emitted by the engine are handed to the worker, whose
/// results come back on the engine's inbound channel. The engine thread exits
/// after processing [`Command::Teardown`]; dropping every command sender tears
/// the engine down the same way.
pub fn spawn_engine_bridge<M>(
    mut engine: Engine,
    backend: M,
) -> (EngineCommandSender, EngineEventReceiver)
where
    M: MediaBackend + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::sync_channel::<Command>(COMMAND_CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::sync_channel::<Event>(EVENT_CHANNEL_CAPACITY);
    let (inbound_tx, inbound_rx) = mpsc::channel::<Inbound>();
    let render_tx = spawn_render_worker(backend, inbound_tx.clone());

    thread::spawn(move || {
        while let Ok(command) = command_rx.recv() {
            if inbound_tx.send(Inbound::Command(command)).is_err() {
                return;
            }
        }
        let _ = inbound_tx.send(Inbound::SendersClosed);
    });

    thread::spawn(move || {
        while let Ok(inbound) = inbound_rx.recv() {
            let command = match inbound {
                Inbound::Command(command) => command,
                Inbound::SendersClosed => {
                    debug!("command senders dropped, tearing down");
                    Command::Teardown
                }
            };
            let teardown = matches!(command, Command::Teardown);
            for event in engine.handle_command(command) {
                if let Event::RenderRequested(request) = &event {
                    let _ = render_tx.send(request.clone());
                }
                if event_tx.send(event).is_err() {
                    engine.teardown();
                    return;
                }
            }
            if teardown {
                break;
            }
        }
        debug!("engine thread finished");
    });

    (command_tx, event_rx)
}

fn spawn_render_worker<M>(backend: M, inbound_tx: mpsc::Sender<Inbound>) -> mpsc::Sender<RenderRequest>
where
    M: MediaBackend + Send + 'static,
{
    let (render_tx, render_rx) = mpsc::channel::<RenderRequest>();

    thread::spawn(move || {
        while let Ok(request) = render_rx.recv() {
            let request = newest_request(request, &render_rx);
            let command = match backend.decode_still(&request.path, request.width, request.height)
            {
                Ok(frame) => Command::RenderCompleted {
                    generation: request.generation,
                    frame,
                },
                Err(error) => {
                    warn!(
                        path = %request.path.display(),
                        generation = request.generation,
                        %error,
                        "image decode failed"
                    );
                    Command::RenderFailed {
                        generation: request.generation,
                        message: error.to_string(),
                    }
                }
            };
            if inbound_tx.send(Inbound::Command(command)).is_err() {
                return;
            }
        }
    });

    render_tx
}

/// Skips queued requests that a later one already supersedes.
fn newest_request(
    mut request: RenderRequest,
    render_rx: &mpsc::Receiver<RenderRequest>,
) -> RenderRequest {
    while let Ok(next) = render_rx.try_recv() {
        debug!(skipped = request.generation, "render superseded before decode");
        request = next;
    }
    request
}

/// Runs blocking work on its own thread and resolves with its result.
pub async fn run_blocking<T, F>(job: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (result_tx, result_rx) = oneshot::channel();
    thread::spawn(move || {
        let _ = result_tx.send(job());
    });
    result_rx.await.ok()
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::sync::mpsc::RecvTimeoutError;
    use std::thread;
    use std::time::Duration;

    use engine::{Engine, RasterFrame, RenderRequest};
    use iced::futures::{StreamExt, executor, pin_mut};

    use super::{
        BridgeEvent, Command, Event, MediaBackend, bridge_worker_stream_with, newest_request,
        run_blocking, spawn_engine_bridge,
    };

    #[test]
    fn bridge_renders_loaded_image_at_viewport_size() {
        let (command_tx, event_rx) = spawn_engine_bridge(Engine::default(), MockBackend);

        command_tx
            .send(Command::Load {
                path: PathBuf::from("photo.png"),
            })
            .expect("send load command");

        let first = recv(&event_rx);
        let Event::MediaChanged(Some(media)) = first else {
            panic!("expected Event::MediaChanged");
        };
        assert_eq!(media.path, PathBuf::from("photo.png"));
        let Event::RenderRequested(request) = recv(&event_rx) else {
            panic!("expected Event::RenderRequested");
        };
        let Event::FrameReady { generation, frame } = recv(&event_rx) else {
            panic!("expected Event::FrameReady");
        };
        assert_eq!(generation, request.generation);
        assert_eq!((frame.width, frame.height), (1200, 800));
    }

    #[test]
    fn bridge_stays_silent_when_decode_fails() {
        let (command_tx, event_rx) = spawn_engine_bridge(Engine::default(), MockBackend);

        command_tx
            .send(Command::Load {
                path: PathBuf::from("broken.png"),
            })
            .expect("send load command");

        assert!(matches!(recv(&event_rx), Event::MediaChanged(Some(_))));
        assert!(matches!(recv(&event_rx), Event::RenderRequested(_)));
        assert!(
            event_rx
                .recv_timeout(Duration::from_millis(200))
                .is_err()
        );
    }

    #[test]
    fn teardown_ends_engine_thread() {
        let (command_tx, event_rx) = spawn_engine_bridge(Engine::default(), MockBackend);
        command_tx
            .send(Command::Load {
                path: PathBuf::from("clip.mp4"),
            })
            .expect("send load command");
        command_tx
            .send(Command::Teardown)
            .expect("send teardown command");

        let mut events = Vec::new();
        while let Ok(event) = event_rx.recv_timeout(Duration::from_secs(1)) {
            events.push(event);
        }

        assert!(
            events
                .iter()
                .any(|event| matches!(event, Event::ResourceReleased { .. }))
        );
        assert_eq!(events.last(), Some(&Event::MediaChanged(None)));
        assert!(matches!(
            event_rx.recv_timeout(Duration::from_secs(1)),
            Err(RecvTimeoutError::Disconnected)
        ));
    }

    #[test]
    fn dropping_every_sender_tears_down_engine() {
        let (command_tx, event_rx) = spawn_engine_bridge(Engine::default(), MockBackend);
        command_tx
            .send(Command::Load {
                path: PathBuf::from("photo.png"),
            })
            .expect("send load command");
        drop(command_tx);

        let mut events = Vec::new();
        let outcome = loop {
            match event_rx.recv_timeout(Duration::from_secs(2)) {
                Ok(event) => events.push(event),
                Err(error) => break error,
            }
        };

        assert_eq!(outcome, RecvTimeoutError::Disconnected);
        assert!(
            events
                .iter()
                .any(|event| matches!(event, Event::ResourceReleased { .. }))
        );
        assert_eq!(events.last(), Some(&Event::MediaChanged(None)));
    }

    #[test]
    fn queued_render_requests_collapse_to_the_newest() {
        let (render_tx, render_rx) = mpsc::channel();
        for generation in 2..=4 {
            render_tx
                .send(request(generation))
                .expect("queue render request");
        }

        let newest = newest_request(request(1), &render_rx);

        assert_eq!(newest.generation, 4);
        assert!(render_rx.try_recv().is_err());
    }

    #[test]
    fn run_blocking_resolves_with_job_result() {
        let value = executor::block_on(run_blocking(|| 6 * 7));

        assert_eq!(value, Some(42));
    }

    #[test]
    fn bridge_worker_stream_emits_ready_forwards_events_and_disconnected() {
        let (bridge_tx, bridge_rx) = mpsc::channel::<BridgeEvent>();

        thread::spawn(move || {
            let stream = bridge_worker_stream_with(|| {
                spawn_engine_bridge(Engine::default(), MockBackend)
            });
            executor::block_on(async move {
                pin_mut!(stream);
                while let Some(event) = stream.next().await {
                    if bridge_tx.send(event).is_err() {
                        break;
                    }
                }
            });
        });

        let ready = bridge_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("ready event");
        let BridgeEvent::Ready(command_tx) = ready else {
            panic!("expected BridgeEvent::Ready");
        };

        command_tx
            .send(Command::SetEnd(3))
            .expect("send set end command");

        let forwarded = bridge_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("forwarded event");
        assert!(matches!(
            forwarded,
            BridgeEvent::Event(Event::WindowChanged(window)) if window.end == 3
        ));

        command_tx
            .send(Command::Teardown)
            .expect("send teardown command");

        let disconnected = bridge_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("disconnected event");
        assert!(matches!(disconnected, BridgeEvent::Disconnected));
    }

    fn recv(event_rx: &super::EngineEventReceiver) -> Event {
        event_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("engine event")
    }

    fn request(generation: u64) -> RenderRequest {
        RenderRequest {
            generation,
            path: PathBuf::from("photo.png"),
            width: 4,
            height: 4,
        }
    }

    #[derive(Debug, Clone, Copy)]
    struct MockBackend;

    impl MediaBackend for MockBackend {
        fn decode_still(&self, path: &Path, width: u32, height: u32) -> engine::Result<RasterFrame> {
            if path == Path::new("broken.png") {
                return Err(engine::EngineError::Media(
                    media_ffmpeg::MediaFfmpegError::MissingVideoStream(path.to_path_buf()),
                ));
            }
            Ok(RasterFrame {
                width,
                height,
                bytes: Arc::from(vec![0; width as usize * height as usize * 4]),
            })
        }

        fn decode_poster(&self, _path: &Path, _at_seconds: f64) -> engine::Result<RasterFrame> {
            Ok(RasterFrame {
                width: 160,
                height: 90,
                bytes: Arc::from(vec![0; 160 * 90 * 4]),
            })
        }

        fn media_duration(&self, _path: &Path) -> engine::Result<Option<f64>> {
            Ok(Some(3.0))
        }
    }
}
