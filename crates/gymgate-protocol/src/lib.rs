//! Wire protocol between the attendance client and the local reader service.
//!
//! The reader service speaks newline-delimited JSON over one persistent TCP
//! socket. Outbound messages are [`Command`]s discriminated by a `command`
//! tag; inbound messages are [`Event`]s discriminated by a `type` tag. The
//! translation layer is stateless: framing and serialization live here,
//! session state lives in the coordinators built on top.
//!
//! # Usage with Tokio Framed
//!
//! ```no_run
//! use tokio::net::TcpStream;
//! use tokio_util::codec::Framed;
//! use gymgate_protocol::{Command, ReaderCodec};
//! use futures::{SinkExt, StreamExt};
//!
//! # async fn example() -> gymgate_core::Result<()> {
//! let stream = TcpStream::connect("127.0.0.1:8080").await?;
//! let mut framed = Framed::new(stream, ReaderCodec::new());
//!
//! framed.send(Command::Ping).await?;
//!
//! if let Some(Ok(event)) = framed.next().await {
//!     println!("Received: {:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod command;
pub mod event;

pub use codec::{ReaderCodec, ServiceCodec};
pub use command::{Command, TemplateRecord};
pub use event::Event;
