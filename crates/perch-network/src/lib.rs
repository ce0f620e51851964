//! # perch-network
//!
//! 위젯 네트워크 어댑터.
//! open-meteo(날씨)와 open.er-api(환율)를 조회한다. 재시도/백오프는 하지 않는다.

pub mod exchange;
pub mod http;
pub mod weather;
