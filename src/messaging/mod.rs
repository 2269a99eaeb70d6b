mod consumer;
mod producer;

pub use consumer::EventConsumer;
pub use producer::EventPublisher;
