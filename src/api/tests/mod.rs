//! HTTP tests driving the full router in-process
