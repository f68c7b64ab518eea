mod fanout;
mod lifecycle;
