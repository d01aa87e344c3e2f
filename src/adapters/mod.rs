//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter       | Implements  | Connects to                    |
//! |---------------|-------------|--------------------------------|
//! | `config_file` | ConfigPort  | JSON file on disk              |
//! | `lead_pins`   | (lead-off)  | LO+/LO- comparator GPIOs       |
//! | `log_sink`    | EventSink   | `log` facade                   |
//! | `sim_sensor`  | SensorPort  | Synthetic ECG generator        |
//! | `tcp_uart`    | Transport   | UART bytes over a TCP socket   |

pub mod config_file;
pub mod lead_pins;
pub mod log_sink;
pub mod sim_sensor;
pub mod tcp_uart;
