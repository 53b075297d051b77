mod pipeline;
mod session;
