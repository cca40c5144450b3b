//! Background image loader thread.
//!
//! [`loader_thread`] runs on its own OS thread, owns the
//! [`ImageLoader`](crate::resources::imageloader::ImageLoader) and processes
//! [`LoadRequest`]s one at a time. Each finished load is handed to the
//! `on_message` sink as an [`ImageLoadMessage`], still on the loader thread,
//! so completions take effect without the render thread doing anything.
//!
//! The thread exits when the shutdown channel fires or disconnects, checked
//! before and after every load, or when the request channel disconnects.
//! Requests still queued at shutdown are discarded and a load in flight is
//! not reported.

use std::sync::Arc;

use crossbeam_channel::{Receiver, TryRecvError};
use log::debug;

use crate::events::imageload::{ImageLoadMessage, LoadRequest};
use crate::resources::imageloader::ImageLoader;

fn shutdown_requested(rx_shutdown: &Receiver<()>) -> bool {
    !matches!(rx_shutdown.try_recv(), Err(TryRecvError::Empty))
}

/// Entry point of the image loader thread.
pub fn loader_thread<L, F>(
    loader: L,
    rx_req: Receiver<LoadRequest>,
    rx_shutdown: Receiver<()>,
    mut on_message: F,
) where
    L: ImageLoader,
    F: FnMut(ImageLoadMessage<L::Image>),
{
    while let Ok(LoadRequest {
        index,
        generation,
        path,
    }) = rx_req.recv()
    {
        if shutdown_requested(&rx_shutdown) {
            break;
        }
        let msg = match loader.load(&path) {
            Ok(image) => ImageLoadMessage::Loaded {
                index,
                generation,
                image: Arc::new(image),
            },
            Err(error) => {
                debug!("Image {} failed to load: {}", index, error);
                ImageLoadMessage::Failed {
                    index,
                    generation,
                    error,
                }
            }
        };
        if shutdown_requested(&rx_shutdown) {
            break;
        }
        on_message(msg);
    }
    debug!("Image loader thread exiting");
}
