use std::io::{self, Write};

use crate::session::SessionResult;

pub const PROJECTION_CSV_HEADER: &str = "date,day,session,starting_capital,contract,units,target_points,tax,commission,net_profit,ending_capital,highlighted\n";

pub struct ProjectionCsvWriter<W: Write> {
    writer: W,
}

impl<W: Write> ProjectionCsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        self.writer.write_all(PROJECTION_CSV_HEADER.as_bytes())
    }

    pub fn append_sessions(&mut self, sessions: &[SessionResult]) -> io::Result<()> {
        for session in sessions {
            writeln!(
                self.writer,
                "{}-{:02}-{:02},{},{},{},{},{},{},{},{},{},{},{}",
                session.date.year(),
                u8::from(session.date.month()),
                session.date.day(),
                session.day_index,
                session.session.as_str(),
                session.starting_capital,
                session.chosen_contract.as_str(),
                session.units_traded,
                session.target_points,
                session.tax,
                session.commission,
                session.net_profit,
                session.ending_capital,
                session.highlighted,
            )?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

pub fn projection_csv(sessions: &[SessionResult]) -> io::Result<String> {
    let mut writer = ProjectionCsvWriter::new(Vec::new());
    writer.write_header()?;
    writer.append_sessions(sessions)?;
    let bytes = writer.finish()?;
    String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

#[cfg(test)]
mod tests {
    use core_sim::{ContractSize, ContractSpec, SessionLabel};
    use time::macros::date;

    use super::{projection_csv, PROJECTION_CSV_HEADER};
    use crate::session::{simulate_session, SessionRequest};

    #[test]
    fn writes_header_then_one_row_per_session() {
        let contracts = [ContractSpec::new(ContractSize::Big, 184_000, 50)];
        let morning_request = SessionRequest {
            date: date!(2024 - 03 - 04),
            day_index: 1,
            session: SessionLabel::Morning,
            starting_capital: 500_000,
            index_level: 27_740,
            contracts: &contracts,
            points_per_trade: 10,
            trade_count: 2,
            highlighted: true,
        };
        let morning = simulate_session(&morning_request);
        let night = simulate_session(&SessionRequest {
            session: SessionLabel::Night,
            starting_capital: morning.ending_capital,
            trade_count: 0,
            highlighted: false,
            ..morning_request
        });

        let csv = projection_csv(&[morning, night]).unwrap();

        assert_eq!(
            csv,
            format!(
                "{PROJECTION_CSV_HEADER}\
                 2024-03-04,1,morning,500000,big,2,20,888,200,6912,506912,true\n\
                 2024-03-04,1,night,506912,idle,0,0,0,0,0,506912,false\n"
            )
        );
    }

    #[test]
    fn empty_projection_is_header_only() {
        assert_eq!(projection_csv(&[]).unwrap(), PROJECTION_CSV_HEADER);
    }
}
