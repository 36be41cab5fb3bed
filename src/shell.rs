//! The interactive menu shell. It displays the main menu, reads a choice,
//! and dispatches to one of the 14 actions, each of which prompts for its
//! inputs and runs parameterized statements against the session. Statement
//! failures abandon the current action and return to the menu; end of input
//! exits the shell.

use itertools::Itertools as _;

use crate::error::{Error, Result};
use crate::input::{self, Input};
use crate::session::Session;

/// The main menu.
const MENU: &str = "\
MAIN MENU
---------
1.  Add User
2.  Add Booking
3.  Add Movie Showing for an Existing Theater
4.  Cancel Pending Bookings
5.  Change Seats Reserved for a Booking
6.  Remove a Payment
7.  Clear Cancelled Bookings
8.  Remove Shows on a Given Date
9.  List Theaters in a Cinema Playing a Given Show
10. List Shows that Start at a Given Time and Date
11. List Movie Titles Containing \"love\" Released After 2010
12. List Users with a Pending Booking
13. List Show Info for a Movie at a Cinema in a Date Range
14. List Booking Info for a User
15. Exit";

/// The menu choice that exits the shell.
const EXIT: i32 = 15;

/// An interactive shell against a movie ticketing database.
pub struct Shell {
    /// The database session.
    session: Session,
    /// The input source. Injected so tests can script it.
    input: Box<dyn Input>,
}

impl Shell {
    /// Creates a new shell using the given session and input source.
    pub fn new(session: Session, input: Box<dyn Input>) -> Self {
        Self { session, input }
    }

    /// Closes the underlying database session.
    pub fn close(&mut self) {
        self.session.close()
    }

    /// Runs the shell until the user exits.
    pub fn run(&mut self) -> Result<()> {
        loop {
            println!("\n{MENU}");
            let Some(choice) = input::int(&mut *self.input, "Please make your choice: ")? else {
                break;
            };
            if choice == EXIT {
                break;
            }
            match self.dispatch(choice) {
                Ok(()) => {}
                // Statement failures don't terminate the session; report
                // them and return to the menu.
                Err(error @ Error::Statement(_)) => eprintln!("Error: {error}"),
                Err(error) => return Err(error),
            }
        }
        Ok(())
    }

    /// Dispatches a menu choice.
    fn dispatch(&mut self, choice: i32) -> Result<()> {
        match choice {
            1 => self.add_user(),
            2 => self.add_booking(),
            3 => self.add_show(),
            4 => self.cancel_pending_bookings(),
            5 => self.change_seats(),
            6 => self.remove_payment(),
            7 => self.clear_cancelled_bookings(),
            8 => self.remove_shows_on_date(),
            9 => self.list_theaters_playing_show(),
            10 => self.list_shows_at(),
            11 => self.list_love_movies(),
            12 => self.list_users_with_pending_booking(),
            13 => self.list_show_info_in_range(),
            14 => self.list_bookings_for_user(),
            choice => {
                println!("Invalid choice {choice}, please pick a menu option between 1 and {EXIT}.");
                Ok(())
            }
        }
    }

    /// 1: adds a user.
    fn add_user(&mut self) -> Result<()> {
        let input = &mut *self.input;
        let Some(fname) = input::text(input, "First name: ", 32)? else { return Ok(()) };
        let Some(lname) = input::text(input, "Last name: ", 32)? else { return Ok(()) };
        let Some(email) = input::text(input, "Email: ", 64)? else { return Ok(()) };
        let Some(phone) = input::long(input, "Phone number (e.g. 9314736096): ")? else {
            return Ok(());
        };
        let Some(pwd) = input::text(input, "Password: ", 64)? else { return Ok(()) };
        self.session.execute(
            "INSERT INTO Users (email, lname, fname, phone, pwd) VALUES ($1, $2, $3, $4, $5)",
            &[&email, &lname, &fname, &phone, &pwd],
        )?;
        println!("User {email} added.");
        Ok(())
    }

    /// 2: adds a booking, after checking that the booking id is free and
    /// that the show and user exist.
    fn add_booking(&mut self) -> Result<()> {
        let input = &mut *self.input;
        let Some(bid) = input::int(input, "Booking id: ")? else { return Ok(()) };
        let Some(status) =
            input::one_of(input, "Status (Paid, Canceled or Pending): ", &["Paid", "Canceled", "Pending"])?
        else {
            return Ok(());
        };
        let Some(bdatetime) = input::datetime(input, "Booking date and time (MM/DD/YYYY HH:MM): ")?
        else {
            return Ok(());
        };
        let Some(seats) = input::int(input, "Number of seats: ")? else { return Ok(()) };
        let Some(sid) = input::int(input, "Show id: ")? else { return Ok(()) };
        let Some(email) = input::text(input, "User email: ", 64)? else { return Ok(()) };

        let mut problems = 0;
        if self.session.query_exists("SELECT bid FROM Bookings WHERE bid = $1", &[&bid])? {
            println!("Booking {bid} already exists.");
            problems += 1;
        }
        if !self.session.query_exists("SELECT sid FROM Shows WHERE sid = $1", &[&sid])? {
            println!("Show {sid} does not exist.");
            problems += 1;
        }
        if !self.session.query_exists("SELECT email FROM Users WHERE email = $1", &[&email])? {
            println!("User {email} does not exist.");
            problems += 1;
        }
        if problems > 0 {
            println!("Please fix the above and try again.");
            return Ok(());
        }

        self.session.execute(
            "INSERT INTO Bookings (bid, status, bdatetime, seats, sid, email) \
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[&bid, &status, &bdatetime, &seats, &sid, &email],
        )?;
        println!("Booking {bid} added.");
        Ok(())
    }

    /// 3: adds a movie, a show of it, and schedules the show in an existing
    /// theater.
    fn add_show(&mut self) -> Result<()> {
        let Some(tid) = input::int(&mut *self.input, "Theater id: ")? else { return Ok(()) };
        if self.session.query_print("SELECT * FROM Theaters WHERE tid = $1", &[&tid])? == 0 {
            println!("Theater {tid} does not exist.");
            return Ok(());
        }

        let input = &mut *self.input;
        let Some(mvid) = input::int(input, "Movie id: ")? else { return Ok(()) };
        let Some(title) = input::text(input, "Title: ", 128)? else { return Ok(()) };
        let Some(rdate) = input::date(input, "Release date (MM/DD/YYYY): ")? else {
            return Ok(());
        };
        let Some(country) = input::text(input, "Country code: ", 5)? else { return Ok(()) };
        let Some(description) = input::text(input, "Description: ", 128)? else { return Ok(()) };
        let Some(duration) = input::int(input, "Duration in seconds: ")? else { return Ok(()) };
        let Some(lang) = input::text(input, "Language code (e.g. en): ", 2)? else {
            return Ok(());
        };
        let Some(genre) = input::text(input, "Genre: ", 128)? else { return Ok(()) };
        self.session.execute(
            "INSERT INTO Movies (mvid, title, rdate, country, description, duration, lang, genre) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            &[&mvid, &title, &rdate, &country, &description, &duration, &lang, &genre],
        )?;
        println!("Movie {mvid} added.");

        let input = &mut *self.input;
        let Some(sid) = input::int(input, "Show id: ")? else { return Ok(()) };
        let Some(sdate) = input::date(input, "Show date (MM/DD/YYYY): ")? else { return Ok(()) };
        let Some(sttime) = input::time(input, "Start time (HH:MM): ")? else { return Ok(()) };
        let Some(edtime) = input::time(input, "End time (HH:MM): ")? else { return Ok(()) };
        self.session.execute(
            "INSERT INTO Shows (sid, mvid, sdate, sttime, edtime) VALUES ($1, $2, $3, $4, $5)",
            &[&sid, &mvid, &sdate, &sttime, &edtime],
        )?;
        println!("Show {sid} added.");

        self.session.execute("INSERT INTO Plays (sid, tid) VALUES ($1, $2)", &[&sid, &tid])?;
        println!("Show {sid} scheduled in theater {tid}.");
        Ok(())
    }

    /// 4: cancels all pending bookings, zeroing their seats.
    fn cancel_pending_bookings(&mut self) -> Result<()> {
        let Some(confirmed) =
            input::confirm(&mut *self.input, "Cancel all pending bookings? (y/n) ")?
        else {
            return Ok(());
        };
        if !confirmed {
            return Ok(());
        }
        self.session.execute("UPDATE Bookings SET seats = 0 WHERE status = 'Pending'", &[])?;
        let count = self
            .session
            .execute("UPDATE Bookings SET status = 'Canceled' WHERE status = 'Pending'", &[])?;
        println!("Canceled {count} pending bookings.");
        Ok(())
    }

    /// 5: moves a booking to a different seat, offering free seats at the
    /// same price in the same theater.
    fn change_seats(&mut self) -> Result<()> {
        let Some(bid) = input::int(&mut *self.input, "Booking id: ")? else { return Ok(()) };
        println!("Current seats for booking {bid}:");
        if self.session.query_print("SELECT ssid, price FROM ShowSeats WHERE bid = $1", &[&bid])?
            == 0
        {
            println!("Booking {bid} has no seats.");
            return Ok(());
        }
        let Some(ssid) = input::int(&mut *self.input, "Seat to change (ssid): ")? else {
            return Ok(());
        };

        let free = self.session.query_collect(
            "SELECT s.ssid FROM ShowSeats s, Plays p \
             WHERE s.bid IS NULL AND s.sid = p.sid \
             AND s.price = (SELECT price FROM ShowSeats WHERE ssid = $1) \
             AND p.tid = (SELECT p2.tid FROM ShowSeats s2, Plays p2 \
                          WHERE s2.sid = p2.sid AND s2.ssid = $1)",
            &[&ssid],
        )?;
        if free.is_empty() {
            println!("No free seats available at the same price.");
            return Ok(());
        }
        println!(
            "Free seats at the same price: {}",
            free.iter().map(|row| row[0].as_str()).join(" ")
        );

        let Some(new_ssid) = input::int(&mut *self.input, "New seat (ssid): ")? else {
            return Ok(());
        };
        self.session.execute("UPDATE ShowSeats SET bid = NULL WHERE ssid = $1", &[&ssid])?;
        self.session.execute("UPDATE ShowSeats SET bid = $1 WHERE ssid = $2", &[&bid, &new_ssid])?;
        println!("Booking {bid} moved from seat {ssid} to seat {new_ssid}.");
        Ok(())
    }

    /// 6: removes a payment and cancels its booking.
    fn remove_payment(&mut self) -> Result<()> {
        let Some(pid) = input::int(&mut *self.input, "Payment id: ")? else { return Ok(()) };
        let rows =
            self.session.query_collect("SELECT bid FROM Payments WHERE pid = $1", &[&pid])?;
        let Some(row) = rows.first() else {
            println!("Payment {pid} does not exist.");
            return Ok(());
        };
        let bid: i32 = row[0]
            .parse()
            .map_err(|_| Error::Statement(format!("unexpected booking id {}", row[0])))?;
        self.session.execute("UPDATE Bookings SET status = 'Canceled' WHERE bid = $1", &[&bid])?;
        self.session.execute("DELETE FROM Payments WHERE pid = $1", &[&pid])?;
        println!("Payment {pid} removed and booking {bid} canceled.");
        Ok(())
    }

    /// 7: deletes all canceled bookings, reporting how many were deleted.
    fn clear_cancelled_bookings(&mut self) -> Result<()> {
        let count = self.session.execute("DELETE FROM Bookings WHERE status = 'Canceled'", &[])?;
        println!("Deleted {count} canceled bookings.");
        Ok(())
    }

    /// 8: deletes all shows on a given date in a given cinema, displaying
    /// them first.
    fn remove_shows_on_date(&mut self) -> Result<()> {
        let input = &mut *self.input;
        let Some(sdate) = input::date(input, "Date (MM/DD/YYYY): ")? else { return Ok(()) };
        let Some(cid) = input::int(input, "Cinema id: ")? else { return Ok(()) };
        println!("Deleting all shows on {} in cinema {cid}:", sdate.format("%m/%d/%Y"));
        self.session.query_print(
            "SELECT * FROM Shows WHERE sdate = $1 AND sid IN \
             (SELECT p.sid FROM Plays p, Theaters t WHERE p.tid = t.tid AND t.cid = $2)",
            &[&sdate, &cid],
        )?;
        let count = self.session.execute(
            "DELETE FROM Shows WHERE sdate = $1 AND sid IN \
             (SELECT p.sid FROM Plays p, Theaters t WHERE p.tid = t.tid AND t.cid = $2)",
            &[&sdate, &cid],
        )?;
        println!("Deleted {count} shows.");
        Ok(())
    }

    /// 9: lists all theaters in a cinema playing a given show.
    fn list_theaters_playing_show(&mut self) -> Result<()> {
        let input = &mut *self.input;
        let Some(cid) = input::int(input, "Cinema id: ")? else { return Ok(()) };
        let Some(sid) = input::int(input, "Show id: ")? else { return Ok(()) };
        println!("Theaters in cinema {cid} playing show {sid}:");
        self.session.query_print(
            "SELECT t.* FROM Theaters t, Plays p \
             WHERE p.sid = $1 AND t.cid = $2 AND p.tid = t.tid",
            &[&sid, &cid],
        )?;
        Ok(())
    }

    /// 10: lists all shows starting at a given time and date.
    fn list_shows_at(&mut self) -> Result<()> {
        let input = &mut *self.input;
        let Some(sdate) = input::date(input, "Date (MM/DD/YYYY): ")? else { return Ok(()) };
        let Some(sttime) = input::time(input, "Start time (HH:MM): ")? else { return Ok(()) };
        println!("Shows starting on {} at {sttime}:", sdate.format("%m/%d/%Y"));
        self.session.query_print(
            "SELECT * FROM Shows WHERE sdate = $1 AND sttime = $2",
            &[&sdate, &sttime],
        )?;
        Ok(())
    }

    /// 11: lists movie titles containing the word "love" released after
    /// 2010.
    fn list_love_movies(&mut self) -> Result<()> {
        self.session.query_print(
            "SELECT title FROM Movies \
             WHERE (title ILIKE 'love %' OR title ILIKE '% love' OR title ILIKE '% love %') \
             AND rdate >= '2011-01-01' ORDER BY title",
            &[],
        )?;
        Ok(())
    }

    /// 12: lists name and email of users with a pending booking.
    fn list_users_with_pending_booking(&mut self) -> Result<()> {
        self.session.query_print(
            "SELECT u.fname, u.lname, u.email FROM Users u, Bookings b \
             WHERE b.status = 'Pending' AND b.email = u.email",
            &[],
        )?;
        Ok(())
    }

    /// 13: lists title, duration, date and start time of shows playing a
    /// given movie at a given cinema during a date range.
    fn list_show_info_in_range(&mut self) -> Result<()> {
        let input = &mut *self.input;
        let Some(start) = input::date(input, "Start date (MM/DD/YYYY): ")? else { return Ok(()) };
        let Some(end) = input::date(input, "End date (MM/DD/YYYY): ")? else { return Ok(()) };
        let Some(cid) = input::int(input, "Cinema id: ")? else { return Ok(()) };
        let Some(mvid) = input::int(input, "Movie id: ")? else { return Ok(()) };
        println!(
            "Shows for movie {mvid} at cinema {cid} between {} and {}:",
            start.format("%m/%d/%Y"),
            end.format("%m/%d/%Y")
        );
        self.session.query_print(
            "SELECT m.title, m.duration, s.sdate, s.sttime \
             FROM Plays p, Shows s, Cinemas c, Theaters t, Movies m \
             WHERE c.cid = t.cid AND t.tid = p.tid AND p.sid = s.sid AND s.mvid = m.mvid \
             AND m.mvid = $1 AND c.cid = $2 AND s.sdate >= $3 AND s.sdate <= $4",
            &[&mvid, &cid, &start, &end],
        )?;
        Ok(())
    }

    /// 14: lists a user's bookings, then the movie, show, theater and seat
    /// of each.
    fn list_bookings_for_user(&mut self) -> Result<()> {
        let Some(email) = input::text(&mut *self.input, "Email: ", 64)? else { return Ok(()) };
        if self.session.query_print("SELECT * FROM Bookings WHERE email = $1", &[&email])? == 0 {
            println!("No bookings for {email}.");
            return Ok(());
        }
        self.session.query_print(
            "SELECT m.title, s.sdate, s.sttime, t.tname, cs.sno \
             FROM Movies m, Shows s, Bookings b, ShowSeats ss, Theaters t, CinemaSeats cs \
             WHERE b.email = $1 AND s.sid = b.sid AND m.mvid = s.mvid \
             AND b.bid = ss.bid AND cs.csid = ss.csid AND cs.tid = t.tid",
            &[&email],
        )?;
        Ok(())
    }
}
