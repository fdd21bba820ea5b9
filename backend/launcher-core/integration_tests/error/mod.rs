mod readiness;
mod spawn;
