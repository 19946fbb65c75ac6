//! End-to-end dissection tests.

mod io;
mod pcap;
mod projection;
mod selection;
mod session;
