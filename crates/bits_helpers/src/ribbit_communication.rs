use std::sync::{Arc, LazyLock};

use bevy::prelude::*;
use parking_lot::Mutex;
use ribbit_bits::{BitDuration, BitMessage, BitParameters, BitResult, RibbitMessage};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::MessageEvent;

type MessageQueue<T> = LazyLock<Arc<Mutex<Vec<T>>>>;

/// Messages received from the Ribbit host, drained once per frame.
pub static RIBBIT_MESSAGE_QUEUE: MessageQueue<RibbitMessage> =
    LazyLock::new(|| Arc::new(Mutex::new(Vec::new())));

/// Outgoing messages when there is no browser host to post them to.
#[cfg(not(target_arch = "wasm32"))]
pub static BIT_MESSAGE_QUEUE: MessageQueue<BitMessage> =
    LazyLock::new(|| Arc::new(Mutex::new(Vec::new())));

#[cfg(target_arch = "wasm32")]
fn listen_ribbit_messages() {
    let Some(window) = web_sys::window() else {
        error!("No global `window`, Ribbit messages will not be received");
        return;
    };
    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        match serde_wasm_bindgen::from_value::<RibbitMessage>(event.data()) {
            Ok(message) => RIBBIT_MESSAGE_QUEUE.lock().push(message),
            Err(err) => error!("Could not parse ribbit message {:?}: {err:?}", event.data()),
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Err(err) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to add message event listener: {err:?}");
        return;
    }

    // The listener lives as long as the page.
    closure.forget();
}

#[cfg(not(target_arch = "wasm32"))]
pub fn send_bit_message(message: BitMessage) {
    BIT_MESSAGE_QUEUE.lock().push(message);
}

#[cfg(target_arch = "wasm32")]
pub fn send_bit_message(message: BitMessage) {
    let Some(window) = web_sys::window() else {
        error!("{message:?} not sent, no global `window`.");
        return;
    };
    let Ok(value) = serde_wasm_bindgen::to_value(&message) else {
        error!("Could not serialize {message:?}");
        return;
    };
    let Ok(Some(parent_window)) = window.parent() else {
        error!("{message:?} not sent, parent_window not found.");
        return;
    };
    if let Err(err) = parent_window.post_message(&value, "*") {
        error!("Could not post message {value:?}. {err:?}");
    }
}

/// Messages the Ribbit platform sends to a running bit.
///
/// Implemented once per bit. The platform calls these, the bit never does.
pub trait RibbitMessageHandler: Send + Sync + Default + 'static {
    fn duration(world: &mut World) -> BitDuration;
    fn end(world: &mut World) -> BitResult;
    fn restart(world: &mut World);
}

fn process_ribbit_messages<T: RibbitMessageHandler>(world: &mut World) {
    let messages = core::mem::take(&mut *RIBBIT_MESSAGE_QUEUE.lock());

    for message in messages {
        let reply = match message {
            RibbitMessage::End => Some(BitMessage::End(T::end(world))),
            RibbitMessage::Parameters => Some(BitMessage::Parameters(BitParameters {
                duration: T::duration(world),
            })),
            RibbitMessage::Restart => {
                T::restart(world);
                None
            }
            RibbitMessage::Start => None,
        };
        if let Some(reply) = reply {
            send_bit_message(reply);
        }
    }
}

fn ready() {
    send_bit_message(BitMessage::Ready);
}

#[derive(Default)]
pub struct RibbitCommunicationPlugin<T: RibbitMessageHandler>(core::marker::PhantomData<T>);

impl<T: RibbitMessageHandler> Plugin for RibbitCommunicationPlugin<T> {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, process_ribbit_messages::<T>)
            .add_systems(PostStartup, ready);
        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, listen_ribbit_messages);
    }
}
